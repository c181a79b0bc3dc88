// mediascan-cli/src/main.rs
//
// Entry point for the mediascan binary: parses arguments, sets up logging,
// runs the selected command and maps the outcome to the process exit code.

use clap::Parser;
use mediascan_cli::{Cli, logging, run};
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
