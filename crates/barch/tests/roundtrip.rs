use barch::{
    bmp::{read_bmp, write_bmp},
    decode, encode, Barch, BarchError, ErrorKind, FormatError, ImageCodec, Raster, HEADER_LEN,
};

/// Deterministic pixel source, biased towards white and black
struct Noise(u32);

impl Noise {
    fn next(&mut self) -> u8 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let v = (self.0 >> 16) as u8;
        match v % 8 {
            0..=3 => 255,
            4 | 5 => 0,
            _ => v,
        }
    }

    fn raster(&mut self, width: usize, height: usize) -> Raster {
        let mut pixels: Vec<u8> = (0..width * height).map(|_| self.next()).collect();
        // keep some rows completely white
        for y in (0..height).step_by(3) {
            pixels[y * width..(y + 1) * width].fill(255);
        }
        Raster::new(width, height, pixels).unwrap()
    }
}

#[test]
fn roundtrip_noise() {
    let mut noise = Noise(7);
    for &(w, h) in &[(1, 1), (3, 5), (4, 4), (10, 7), (17, 9), (64, 33), (129, 2)] {
        let raster = noise.raster(w, h);
        let bytes = encode(&raster).unwrap();
        assert_eq!(decode(&bytes).unwrap(), raster, "{}x{}", w, h);
    }
}

#[test]
fn roundtrip_boundaries() -> color_eyre::Result<()> {
    for raster in [
        Raster::new(0, 0, vec![])?,
        Raster::new(1, 1, vec![128])?,
        Raster::new(1, 1, vec![255])?,
        Raster::new(0, 5, vec![])?,
        Raster::new(5, 0, vec![])?,
    ] {
        let bytes = Barch.encode(&raster)?;
        assert_eq!(Barch.decode(&bytes)?, raster);
    }
    Ok(())
}

#[test]
fn width_ten_has_short_tail() {
    let row = [0, 0, 0, 0, 255, 255, 255, 255, 7, 255];
    let raster = Raster::new(10, 1, row.to_vec()).unwrap();
    let bytes = encode(&raster).unwrap();
    // index | 10 0 11 00000111 11111111
    assert_eq!(
        &bytes[HEADER_LEN..],
        &[0b1, 0b10011000, 0b00111111, 0b11111000]
    );
    assert_eq!(decode(&bytes).unwrap(), raster);
}

#[test]
fn all_black_uses_two_bit_codes() {
    let raster = Raster::filled(12, 4, 0).unwrap();
    let bytes = encode(&raster).unwrap();
    assert_eq!(bytes[HEADER_LEN], 0b1111);
    // 4 rows * 3 groups * 2 bits = 24 bits
    assert_eq!(&bytes[HEADER_LEN + 1..], &[0b10101010; 3]);
}

#[test]
fn all_white_has_no_payload() {
    let raster = Raster::filled(33, 20, 255).unwrap();
    let bytes = encode(&raster).unwrap();
    assert_eq!(bytes.len(), HEADER_LEN + 3);
    assert_eq!(&bytes[HEADER_LEN..], &[0, 0, 0]);
}

#[test]
fn truncation_is_an_error() {
    let mut noise = Noise(42);
    for &(w, h) in &[(1, 1), (10, 10), (31, 4)] {
        let raster = noise.raster(w, h);
        let mut bytes = encode(&raster).unwrap();
        bytes.pop();
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat, "{}x{}", w, h);
    }

    let bytes = encode(&Raster::filled(3, 9, 255).unwrap()).unwrap();
    let err = decode(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(
        err,
        BarchError::InvalidFormat(FormatError::RowIndexTruncated { .. })
    ));

    let err = decode(&bytes[..4]).unwrap_err();
    assert!(matches!(
        err,
        BarchError::InvalidFormat(FormatError::HeaderTooShort(4))
    ));
}

#[test]
fn bitmap_to_barch_and_back() {
    let raster = Noise(3).raster(23, 11);
    let bmp = write_bmp(&raster).unwrap();
    let packed = encode(&read_bmp(&bmp).unwrap()).unwrap();
    let unpacked = write_bmp(&decode(&packed).unwrap()).unwrap();
    assert_eq!(bmp, unpacked);
}

#[test]
fn codec_is_usable_as_trait_object() {
    let codec: Box<dyn ImageCodec + Send + Sync> = Box::new(Barch);
    let raster = Noise(9).raster(6, 6);
    let bytes = codec.encode(&raster).unwrap();
    assert_eq!(codec.decode(&bytes).unwrap(), raster);
}
