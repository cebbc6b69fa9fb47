use clap::Parser;
use std::fs;
use std::path::PathBuf;

use unproto::{render_descriptor, UnprotoError};

#[derive(Parser)]
#[command(name = "unproto")]
#[command(about = "Reconstruct schema source text from a descriptor document", long_about = None)]
struct Cli {
    /// Descriptor document file; when omitted the program prints nothing
    input: Option<PathBuf>,
}

fn main() -> Result<(), UnprotoError> {
    let cli = Cli::parse();

    let Some(input) = cli.input else {
        return Ok(());
    };

    let text = fs::read_to_string(&input).map_err(UnprotoError::Io)?;
    let rendered = render_descriptor(&text)?;
    println!("{}", rendered);
    Ok(())
}
