use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use cobbler_inventory::ErrorKind;
use cobbler_inventory::cli::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout is reserved for the inventory document
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli::run(&cli).await {
        Ok(document) => {
            println!("{}", document);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_code(e.kind()))
        }
    }
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Connection => 2,
        ErrorKind::Parse => 3,
        ErrorKind::Filesystem => 4,
        ErrorKind::Config => 5,
        ErrorKind::Serialization => 6,
    }
}
