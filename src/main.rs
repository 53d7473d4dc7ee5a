use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use marquee::agents::llm::create_provider;
use marquee::agents::{Orchestrator, Transcript, UsageAccumulator};
use marquee::catalog::CatalogClient;
use marquee::cli::Cli;
use marquee::config::Settings;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const WELCOME: &str = "Hello! I am your Media Concierge. I can help you search for and request \
Movies and TV Shows on your Overseerr server. What would you like to watch today?";

const CONNECTION_HELP: &str = "**Error:** I encountered a problem connecting to the services. \
Please check your Settings (API Keys/URL) and network connection.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the chat on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.print_probe_url || cli.check {
        let settings = Settings::catalog_only_with_cli(&cli)?;
        let catalog = CatalogClient::new(&settings.catalog);

        if cli.print_probe_url {
            println!("{}", catalog.probe_url());
            return Ok(());
        }

        return match catalog.probe_status().await {
            Ok(status) if status.is_success() => {
                println!("Connected to {}", catalog.base_url());
                Ok(())
            }
            Ok(status) => anyhow::bail!(
                "Catalog at {} answered the connection probe with {}",
                catalog.base_url(),
                status
            ),
            Err(e) => anyhow::bail!("Catalog at {} is unreachable: {}", catalog.base_url(), e),
        };
    }

    let settings = Settings::new_with_cli(&cli)?;
    info!("Using catalog {}", settings.catalog.url);

    let usage = Arc::new(UsageAccumulator::new(settings.usage.cost_per_token));
    let llm = create_provider(&settings.engine)?;
    info!("Reasoning engine: {} ({})", llm.name(), llm.model());
    let catalog = Arc::new(CatalogClient::new(&settings.catalog));
    let orchestrator = Orchestrator::new(settings.agent.clone(), llm, catalog).with_usage(usage.clone());

    let mut transcript = Transcript::new();
    println!("{}\n", WELCOME);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        match text {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset-usage" => {
                usage.reset();
                println!("Usage counter reset.\n");
                continue;
            }
            _ => {}
        }

        match transcript.send(&orchestrator, text, None).await {
            Ok(reply) => {
                println!("\n{}\n", reply.content());
                println!(
                    "[tokens: {} | est. cost: ${:.6}]\n",
                    usage.total(),
                    usage.estimated_cost()
                );
            }
            Err(e) => {
                error!("Turn failed: {}", e);
                println!("\n{}\n\nDetails: {}\n", CONNECTION_HELP, e);
            }
        }
    }

    info!("Session ended after {} messages", transcript.len());
    Ok(())
}
