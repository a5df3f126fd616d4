use barch::ContainerInfo;
use color_eyre::eyre::{self, eyre, WrapErr};
use log::info;
use prettytable::{format, row, Table};

use super::{files::human_size, opt::InfoOpts};

pub fn run(opt: InfoOpts) -> eyre::Result<()> {
    let buffer = std::fs::read(&opt.file)
        .wrap_err_with(|| format!("Failed to read `{}`", opt.file.display()))?;
    let container = ContainerInfo::parse(&buffer)
        .map_err(|e| eyre!("{}: {}", e.kind(), e))?;
    info!("Found BARCH image");

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(row!["width", container.width]);
    table.add_row(row!["height", container.height]);
    table.add_row(row!["stored rows", container.present_rows]);
    table.add_row(row!["row index", human_size(container.index_len as u64)]);
    table.add_row(row!["payload", human_size(container.payload_len as u64)]);
    table.add_row(row!["total", human_size(container.total_len() as u64)]);
    table.add_row(row!["ratio", format!("{:.2}", container.ratio())]);
    table.printstd();
    Ok(())
}
