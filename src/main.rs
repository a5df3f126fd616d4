use barch::Barch;
use barch_tool::cli::{
    self, check, convert, info, list,
    opt::{Command, Options},
};
use color_eyre::eyre;

fn main() -> eyre::Result<()> {
    let opt: Options = cli::init()?;
    match opt.command {
        Command::List(o) => list::run(o),
        Command::Convert(o) => convert::run(&Barch, o),
        Command::Info(o) => info::run(o),
        Command::Check(o) => check::run(&Barch, o),
    }
}
