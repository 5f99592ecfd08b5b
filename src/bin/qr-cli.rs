use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "qr-cli")]
#[command(about = "Client for the QR code service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Base64,
    Svg,
    Png,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Format::Base64 => "base64",
            Format::Svg => "svg",
            Format::Png => "png",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render TEXT as a QR code
    Generate {
        text: String,
        #[arg(short, long, value_enum, default_value = "base64")]
        format: Format,
        #[arg(short, long)]
        size: Option<u32>,
        #[arg(short, long)]
        margin: Option<u32>,
        /// Error correction level: L, M, Q or H
        #[arg(short, long)]
        level: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        background: Option<String>,
        /// Write the image here (PNG is decoded from base64 data URIs too)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Generate {
            text,
            format,
            size,
            margin,
            level,
            color,
            background,
            output,
        } => {
            let mut params = json!({ "text": text, "format": format.as_str() });
            let fields = [
                ("size", size.map(Value::from)),
                ("margin", margin.map(Value::from)),
                ("errorCorrectionLevel", level.map(Value::from)),
                ("color", color.map(Value::from)),
                ("background", background.map(Value::from)),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    params[key] = value;
                }
            }

            let res = client
                .post(format!("{}/qr", cli.url))
                .json(&params)
                .send()
                .await?;

            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: service returned status {}", status);
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
                std::process::exit(1);
            }

            let bytes = match format {
                Format::Base64 => {
                    let body: Value = res.json().await?;
                    match &output {
                        Some(_) => decode_data_uri(&body)?,
                        None => {
                            println!("{}", serde_json::to_string_pretty(&body)?);
                            return Ok(());
                        }
                    }
                }
                Format::Svg | Format::Png => res.bytes().await?.to_vec(),
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None if matches!(format, Format::Svg) => {
                    println!("{}", String::from_utf8_lossy(&bytes));
                }
                None => {
                    eprintln!("Error: PNG output needs --output");
                    std::process::exit(1);
                }
            }
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

fn decode_data_uri(body: &Value) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let uri = body["qrCode"]
        .as_str()
        .ok_or("response has no qrCode field")?;
    let (_, payload) = uri.split_once(',').ok_or("qrCode is not a data URI")?;
    Ok(STANDARD.decode(payload)?)
}
