use clap::Parser;
use crosstrader::cli::{Cli, init_logging, run};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_level) {
        eprintln!("error: failed to install logger: {e}");
    }
    run(cli)
}
