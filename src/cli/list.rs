use color_eyre::eyre::{self, WrapErr};
use prettytable::{format, row, Cell, Row, Table};

use super::{
    files::{human_size, list_images},
    opt::ListOpts,
};

pub fn run(opt: ListOpts) -> eyre::Result<()> {
    let entries = list_images(&opt.dir)
        .wrap_err_with(|| format!("Failed to list folder `{}`", opt.dir.display()))?;

    if entries.is_empty() {
        println!(" Empty Folder ");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["name", "bytes", "size"]);
    for entry in entries {
        table.add_row(Row::new(vec![
            Cell::new(&entry.name),
            Cell::new(&format!("{:>10}", entry.size)),
            Cell::new(&human_size(entry.size)),
        ]));
    }
    table.printstd();
    Ok(())
}
