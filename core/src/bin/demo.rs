//! Upload a file, report its status, download one translation, clean up.
//!
//! Usage: `smartling-files-demo <PATH> <FILE_URI> <LOCALE>` with the
//! `SMARTLING_*` variables read by `ClientConfig::from_env` set.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use smartling_files::{ClientConfig, FileApiClient, FileType, Params, UploadParameters};

#[derive(Parser, Debug)]
#[command(name = "smartling-files-demo", about = "Round-trip one file through a Smartling project")]
struct Args {
    /// Local file to upload
    path: PathBuf,

    /// URI the file is stored under in the project
    file_uri: String,

    /// Locale to report status for and download
    locale: String,
}

fn run(path: &Path, file_uri: &str, locale: &str) -> smartling_files::Result<()> {
    let config = ClientConfig::from_env()?;
    let client = FileApiClient::from_config(&config)?;

    let uploaded = client.upload_file(path, file_uri, FileType::PlainText, UploadParameters::default())?;
    info!("uploaded {file_uri}: {uploaded}");

    let status = client.get_status(file_uri, locale, Params::new())?;
    println!("{status:#}");

    if let Some(content) = client.download_file(file_uri, locale, Params::new())? {
        println!("{}", String::from_utf8_lossy(&content));
    }

    if let Err(e) = client.delete_file(file_uri, Params::new()) {
        info!("cleanup of {file_uri} skipped: {e}");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    match run(&args.path, &args.file_uri, &args.locale) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
