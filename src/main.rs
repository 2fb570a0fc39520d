use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;
use webecho::{HttpConfig, ServerTrait, create_server};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("webecho=info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("webecho");

    if args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        print_usage(program);
        return Ok(());
    }
    if args.len() > 3 {
        print_usage(program);
        std::process::exit(1);
    }

    let addr = args.get(1).map(String::as_str).unwrap_or(DEFAULT_ADDR);
    let version = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(env!("CARGO_PKG_VERSION"));

    let config = HttpConfig {
        server_name: Some(format!("webecho/{}", env!("CARGO_PKG_VERSION"))),
        ..HttpConfig::default()
    };
    let server = create_server(addr, version).with_config(config);

    info!(address = %addr, version = %version, "Starting HTTP echo server");
    server
        .run()
        .await
        .wrap_err("Failed to run HTTP echo server")?;

    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [ADDR] [VERSION]");
    eprintln!("  ADDR:    Address to listen on (default: {DEFAULT_ADDR})");
    eprintln!("  VERSION: Version reported at /version (default: {})", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program}                        # Listen on {DEFAULT_ADDR}");
    eprintln!("  {program} 0.0.0.0:3000           # Listen on all interfaces, port 3000");
    eprintln!("  {program} localhost:3000 v1.2.3  # Report v1.2.3 at /version");
    eprintln!();
    eprintln!("Set RUST_LOG to change the log filter (default: webecho=info).");
}
