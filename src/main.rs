mod args;
mod cli;

use clap::Parser;
use log::{error, warn, LevelFilter};

use crate::args::Args;

fn main() {
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    match cli::run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("{:?}", e);
            if let Some(kind) = e.program_error_kind() {
                warn!("The transaction was rejected ({:?}), the ledger is unchanged", kind);
            }
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
