use std::process::ExitCode;

use clap::Parser;
use paket_core::{ClientError, SaveClient};
use paket_server::init_tracing;

/// Send a URL to a Paket server
#[derive(Debug, Parser)]
#[command(name = "paket-save")]
struct Args {
    /// URL to save
    url: String,

    /// save endpoint of the server
    #[arg(short, long, default_value = "http://localhost:8080/save")]
    target: String,

    /// custom headers as a JSON object, e.g. '{"Authorization": "Bearer ..."}'
    #[arg(short = 'H', long, default_value = "")]
    headers: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let client = SaveClient::new(args.target, &args.headers);
    let outcome = client
        .spawn_save(args.url)
        .await
        .unwrap_or(Err(ClientError::Dropped));

    match outcome {
        Ok(()) => {
            println!("✓ saved");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("✗ {err}");
            ExitCode::FAILURE
        }
    }
}
