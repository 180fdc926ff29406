use clap::Parser;
use omni_nexus_backend::{api::ApiState, config::Config, init_tracing};
use tracing::info;

/// Ask the backend a question from the terminal
#[derive(Debug, Parser)]
#[command(name = "nexus", version)]
struct Cli {
    /// Question (or message, with --relay)
    text: Vec<String>,

    /// Company identifier forwarded to Sienge
    #[arg(long)]
    empresa: Option<String>,

    /// Send the text through the plain message relay instead of the intent router
    #[arg(long)]
    relay: bool,

    /// User id reported by the relay
    #[arg(long, default_value = "cli")]
    user: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let text = cli.text.join(" ");
    if text.trim().is_empty() {
        return Err("no question given".into());
    }

    let config = Config::from_env()?;
    let state = ApiState::from_config(&config)?;

    if cli.relay {
        info!(user = %cli.user, "Relaying message");
        let reply = state.relay.relay(&cli.user, &text).await;
        println!("{}", reply);
        return Ok(());
    }

    info!(empresa = ?cli.empresa, "Running intent router");

    match state.router.answer(&text, cli.empresa.as_deref()).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Query failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
