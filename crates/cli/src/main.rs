use anyhow::Context;
use clap::{Parser, Subcommand};

use shelf_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "shelf", about = "Book review service control", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind host, overriding configuration
        #[arg(long)]
        host: Option<String>,
        /// Bind port, overriding configuration
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            tracing::info!(env = ?settings.environment, "shelf serve starting");
            shelf_app::run(settings).await
        }
    }
}
