use super::super::args::*;
use crate::exit_codes::EXIT_SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Issue(args) => super::issue::run(args, &global).await,
        Command::Verify(args) => super::verify::run(args, &global).await,
        Command::Decode(args) => super::decode::run(args, &global),
        Command::Config => super::config::run(&global),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}
