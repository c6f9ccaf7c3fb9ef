use std::path::PathBuf;

use clap::Parser;

use plcgen_cli::cli;
use plcgen_cli::logger;

#[derive(Parser, Debug)]
#[command(name = "plcgen", about = "Declarative PLC program-model generator")]
struct Args {
    /// Turn on verbose logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Build and validate the models in a directory.
    Check {
        /// The directory to read the model documents from.
        #[arg(short, long, default_value = "./models/in")]
        input: PathBuf,
    },
    /// Build the models and write one resolved model file per document.
    Export {
        /// The directory to read the model documents from.
        #[arg(short, long, default_value = "./models/in")]
        input: PathBuf,
        /// The directory to write the resolved models to.
        #[arg(short, long, default_value = "./models/out")]
        output: PathBuf,
    },
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    logger::configure(args.verbose)?;

    match args.action {
        Action::Check { input } => cli::check(&input),
        Action::Export { input, output } => cli::export(&input, &output),
    }
}
