use clap::Parser;
use photo_relay::{
    client::{UploadForm, UploadOutcome},
    config::ClientConfig,
    startup,
};
use std::{path::PathBuf, process::ExitCode};
use tokio::sync::mpsc;

/// Upload a photo to the photo upload service.
#[derive(Parser, Debug)]
#[command(name = "photo-client", version)]
struct Args {
    /// Image file to upload.
    file: PathBuf,

    /// Free-text description stored with the photo.
    #[arg(short, long, default_value = "")]
    description: String,

    /// Upload endpoint, e.g. http://localhost:8080/api/v1/upload.
    #[arg(long, env = "PHOTO_UPLOAD_SERVICE_URL")]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    startup::init_tracing();
    let args = Args::parse();

    let mut form = UploadForm::new(&ClientConfig::load(args.url))?;
    form.select_file(Some(args.file));
    form.set_description(args.description);

    let (tx, mut rx) = mpsc::unbounded_channel();
    if !form.submit(&tx).await {
        eprintln!("{}", form.status());
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", form.status());

    // This task owns the form; the outcome is applied here and nowhere else.
    let Some(outcome) = rx.recv().await else {
        anyhow::bail!("upload task ended without reporting an outcome");
    };
    let succeeded = matches!(outcome, UploadOutcome::Succeeded { .. });
    form.apply(outcome);

    if succeeded {
        println!("{}", form.status());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", form.status());
        Ok(ExitCode::FAILURE)
    }
}
