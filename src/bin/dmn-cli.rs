use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dmn_evaluator::client::{ClientError, EvaluatorClient};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "dmn-cli")]
#[command(about = "Command-line client for the DMN evaluator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the evaluator is up
    Health,
    /// Evaluate a JSON payload from a file ("-" reads stdin)
    Evaluate { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = EvaluatorClient::new(&cli.url);

    let result = match cli.command {
        Commands::Health => client.health().await,
        Commands::Evaluate { file } => {
            let payload = read_payload(&file)?;
            client.evaluate(&payload).await
        }
    };

    match result {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(ClientError::Status { status, body }) => {
            eprintln!("Error: evaluator returned status {}", status);
            eprintln!("Response: {}", body);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn read_payload(file: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    let text = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    Ok(serde_json::from_str(&text)?)
}
