use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use relay_sync::preview::PreviewPayload;
use relay_sync::relay::RelayPayload;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the relay-sync backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct KeyArgs {
    /// YouTube stream key
    #[arg(long)]
    youtube: Option<String>,
    /// Facebook stream key
    #[arg(long)]
    facebook: Option<String>,
    /// Twitch stream key
    #[arg(long)]
    twitch: Option<String>,
    /// Custom RTMP target URL (repeatable)
    #[arg(long = "custom")]
    custom: Vec<String>,
}

impl From<KeyArgs> for RelayPayload {
    fn from(args: KeyArgs) -> Self {
        RelayPayload {
            youtube: args.youtube,
            facebook: args.facebook,
            twitch: args.twitch,
            custom: args.custom,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check the backend is up
    Status,
    /// Relay to the given platforms (replaces any current relays)
    Start(KeyArgs),
    /// Stop all relays
    Stop,
    /// Resolve preview URLs for the given keys
    Preview {
        #[command(flatten)]
        keys: KeyArgs,
        /// Local ingest stream name for the HLS preview
        #[arg(long)]
        ingest: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/api/status", base)).send().await?,
        Commands::Start(keys) => {
            client
                .post(format!("{}/api/startRelay", base))
                .json(&RelayPayload::from(keys))
                .send()
                .await?
        }
        Commands::Stop => client.post(format!("{}/api/stopRelay", base)).send().await?,
        Commands::Preview { keys, ingest } => {
            let payload = PreviewPayload {
                targets: keys.into(),
                ingest,
            };
            client
                .post(format!("{}/api/previews", base))
                .json(&payload)
                .send()
                .await?
        }
    };

    let ok = print_response(res).await?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: relay-sync returned status {}", status);
        eprintln!("{}", rendered);
    }
    Ok(status.is_success())
}
