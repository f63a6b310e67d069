use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "pult-cli")]
#[command(about = "Management CLI for xray-pult", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "PULT_URL")]
    url: String,

    #[arg(short, long, env = "TOKEN")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a client id to every inbound
    Add { id: String },
    /// Remove a client id from every inbound
    Del { id: String },
    /// List the client directory
    Users,
    /// Fetch the subscription payload for a client
    Sub {
        id: String,
        /// Print the decoded payload instead of base64
        #[arg(long)]
        decode: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Add { id } => {
            let res = client
                .post(format!("{}/add_user", base))
                .json(&json!({ "id": id, "token": cli.token }))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Del { id } => {
            let res = client
                .post(format!("{}/del_user", base))
                .json(&json!({ "id": id, "token": cli.token }))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Users => {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", cli.token))?,
            );
            let res = client
                .get(format!("{}/users", base))
                .headers(headers)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Sub { id, decode } => {
            let res = client.get(format!("{}/sub/{}", base, id)).send().await?;
            if !res.status().is_success() {
                return print_json(res).await;
            }
            if let Some(title) = res.headers().get("profile-title").and_then(|h| h.to_str().ok()) {
                eprintln!("profile-title: {}", title);
            }
            let body = res.text().await?;
            if decode {
                println!("{}", String::from_utf8_lossy(&BASE64_STANDARD.decode(body.trim())?));
            } else {
                println!("{}", body);
            }
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: service returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
    Ok(())
}
