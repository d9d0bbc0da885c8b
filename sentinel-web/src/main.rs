//! Recon Sentinel Web Server
//!
//! Investigation dashboard and JSON API.

use clap::Parser;
use sentinel_core::{init_logging, LoggingConfig};
use sentinel_web::openapi::get_openapi_json;
use sentinel_web::SentinelServer;
use sentinel_web::WebConfig;

/// Recon Sentinel Web Server - OSINT investigation dashboard
#[derive(Parser)]
#[command(name = "sentinel-web")]
#[command(about = "A web dashboard for Recon Sentinel investigations")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides SENTINEL_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides SENTINEL_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Sentinel configuration file (overrides SENTINEL_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the OpenAPI document and exit
    #[arg(long)]
    openapi: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.openapi {
        match get_openapi_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to generate OpenAPI document: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut logging = LoggingConfig::default().with_level(&args.log_level);
    logging.filter_directives.push(format!("sentinel_web={}", args.log_level));
    logging.filter_directives.push("tower_http=debug".to_string());
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    // Environment first, command line wins
    let mut config = WebConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.dev_mode |= args.dev;
    if args.config.is_some() {
        config.config_path = args.config;
    }

    println!("Starting Recon Sentinel Web Server");
    println!("Server: http://{}", config.address());
    println!("Development mode: {}", config.dev_mode);

    if std::env::var("OPENAI_API_KEY").is_err()
        && std::env::var("ANTHROPIC_API_KEY").is_err()
        && std::env::var("GROQ_API_KEY").is_err()
        && std::env::var("OLLAMA_HOST").is_err()
    {
        println!("Warning: no LLM credentials found (OPENAI_API_KEY, ANTHROPIC_API_KEY, GROQ_API_KEY or OLLAMA_HOST).");
        println!("   Enrichment calls will fail until one is configured.");
    }

    let server = match SentinelServer::new(config).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("Server failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["sentinel-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.dev);
        assert_eq!(args.log_level, "info");

        let args = Args::parse_from([
            "sentinel-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--config",
            "sentinel.toml",
        ]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(3000));
        assert!(args.dev);
        assert_eq!(args.config.as_deref(), Some("sentinel.toml"));
    }
}
