use color_eyre::eyre::{Result, WrapErr};
use reqinspect::common::InspectServerTrait;
use reqinspect::http::{HttpConfig, InspectServer};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging, RUST_LOG wins over the default filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reqinspect=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("reqinspect");

    if matches!(args.get(1).map(String::as_str), Some("-h" | "--help")) {
        print_usage(program);
        return Ok(());
    }

    let port = match args.get(1) {
        Some(port) => port
            .parse::<u16>()
            .wrap_err_with(|| format!("Invalid port: {port}"))?,
        None => DEFAULT_PORT,
    };
    let ip = match args.get(2) {
        Some(ip) => ip
            .parse::<IpAddr>()
            .wrap_err_with(|| format!("Invalid bind address: {ip}"))?,
        None => IpAddr::V4(Ipv4Addr::LOCALHOST),
    };

    let mut config = HttpConfig {
        bind_addr: SocketAddr::new(ip, port),
        max_connections: 1000, // Higher limit for production use
        ..Default::default()
    };
    if let Ok(prefix) = std::env::var("REQINSPECT_PREFIX") {
        config.path_prefix = prefix;
    }

    info!(
        address = %config.bind_addr,
        prefix = %config.path_prefix,
        max_connections = config.max_connections,
        "Starting request inspection server"
    );

    let server = InspectServer::new(config);
    server
        .run()
        .await
        .wrap_err("Failed to run request inspection server")?;

    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [port] [bind_ip]");
    eprintln!("  port:    Port to bind to (default: {DEFAULT_PORT})");
    eprintln!("  bind_ip: Address to bind to (default: 127.0.0.1)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG           Log filter (default: reqinspect=info)");
    eprintln!("  REQINSPECT_PREFIX  Path prefix for the endpoints (default: /api)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program}                  # Serve /api/ip, /api/details, /api/error on 127.0.0.1:8080");
    eprintln!("  {program} 9090 0.0.0.0     # Serve on all interfaces, port 9090");
}
