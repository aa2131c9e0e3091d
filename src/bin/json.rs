//! Utility to print an SII file as JSON on stdout.
//!
//! `json <file.sii> [--assets <dir>] [--pretty]`
//!
//! Encrypted files are decrypted in place first, which requires the asset
//! directory holding the decryption tool. Plaintext is streamed from the file.

use siikit::{json::JsonOptions, Config, Decryptor};
use std::{
    env, error,
    io::{self, BufWriter, Write},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut file = None;
    let mut assets = PathBuf::from(".");
    let mut pretty = false;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assets" => assets = args.next().map(PathBuf::from).ok_or("--assets needs a value")?,
            "--pretty" => pretty = true,
            _ => file = Some(PathBuf::from(arg)),
        }
    }

    let file = file.ok_or("usage: json <file.sii> [--assets <dir>] [--pretty]")?;
    let config = Config::from_env(assets)?;
    let doc = Decryptor::from_config(&config).open_document(&file)?;
    tracing::debug!(units = doc.units().len(), "parsed document");

    let stdout = io::stdout().lock();
    let mut writer = BufWriter::new(stdout);
    doc.json()
        .with_options(JsonOptions::new().with_prettyprint(pretty))
        .to_writer(&mut writer)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
