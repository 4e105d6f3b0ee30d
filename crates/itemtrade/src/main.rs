use anyhow::{Context, Result};
use clap::Parser;
use itemtrade::session::SessionCredentials;
use itemtrade::{LoggingObserver, TradeDriver};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "itemtrade", about = "Drive one item trade session with a counterpart")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/itemtrade.toml")]
    config: String,

    /// Id of the account this agent trades as
    #[arg(long)]
    agent_id: u64,

    /// Id of the counterpart account
    #[arg(long)]
    counterpart_id: u64,

    /// Web session id (value of the sessionid cookie)
    #[arg(long, env = "ITEMTRADE_SESSION_ID", hide_env_values = true)]
    session_id: String,

    /// Web login token (value of the steamLogin cookie)
    #[arg(long, env = "ITEMTRADE_LOGIN_TOKEN", hide_env_values = true)]
    login_token: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (respects RUST_LOG env var)
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = itemtrade::load_config(&cli.config)?;
    let credentials = SessionCredentials {
        session_id: cli.session_id,
        login_token: cli.login_token,
    };

    let engine = itemtrade::build_engine(
        &config,
        &credentials,
        cli.agent_id,
        cli.counterpart_id,
        Box::new(LoggingObserver),
    )
    .context("Failed to build trade engine")?;

    let mut driver = TradeDriver::new(engine, config.driver.clone());
    let cancel = driver.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received; cancelling trade");
            cancel.cancel();
        }
    });

    let summary = driver.run().await;

    // Output summary as JSON to stdout
    let output = if cli.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{output}");

    Ok(())
}
