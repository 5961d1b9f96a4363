//! Command-line upload client.
//!
//! Sends one PDF to a running server and prints the extracted text.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pdfhelper::client::{HttpTransport, MemoryClipboard, SelectedFile, UploadClient, UploadOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdf-upload", version, about = "Extract the text of a PDF through a pdfhelper server")]
struct Cli {
    /// PDF file to upload.
    file: PathBuf,

    /// Base URL of the server.
    #[arg(long, env = "PDFHELPER_URL", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Give up on the request after this many seconds.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file = SelectedFile::from_path(&cli.file)
        .await
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let transport = HttpTransport::new(&cli.server, Duration::from_secs(cli.timeout_secs))
        .context("Failed to build HTTP client")?;
    let client = UploadClient::new(transport, MemoryClipboard::default());

    match client.select_file(file).await {
        UploadOutcome::Extracted => {
            println!("{}", client.state().text);
            Ok(ExitCode::SUCCESS)
        }
        UploadOutcome::Rejected(e) | UploadOutcome::Failed(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        UploadOutcome::Superseded => Ok(ExitCode::FAILURE),
    }
}
