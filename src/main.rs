/// Main entry point for the Strapi MCP server
///
/// This file sets up logging, parses command line arguments (or their
/// environment variable equivalents), and starts the MCP server. The server
/// listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use strapi_mcp::{Config, StrapiMcpServer};

/// Command line arguments for the Strapi MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the Strapi instance
    #[arg(long, env = "STRAPI_URL", default_value = "http://localhost:1337")]
    url: String,

    /// API token sent as a bearer credential (optional)
    #[arg(long, env = "STRAPI_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Root directory of the Strapi project source
    #[arg(long, env = "STRAPI_PROJECT_PATH", default_value = ".")]
    project_path: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("strapi_mcp={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting Strapi MCP server");

    let config = Config::new(&args.url, args.api_token, args.project_path)?;
    let server = StrapiMcpServer::new(config)?;

    // Run the MCP server - this will handle JSON-RPC communication over stdin/stdout
    server.run().await?;

    info!("Strapi MCP server shutdown complete");
    Ok(())
}
