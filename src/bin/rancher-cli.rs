use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

use rancher_client::config::{read_config, validate_config, ConfigError};
use rancher_client::observability::init_logging;
use rancher_client::{ClientConfig, Context, HttpClient, HttpRequest, RawResponse};

#[derive(Parser)]
#[command(name = "rancher-cli")]
#[command(about = "Issue requests against the Rancher management API", long_about = None)]
struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(short, long, env = "RANCHER_CLI_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the Rancher server
    #[arg(short, long, env = "RANCHER_URL")]
    url: Option<String>,

    /// API token sent as a bearer credential
    #[arg(short, long, env = "RANCHER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// PEM bundle of extra CA certificates to trust
    #[arg(long)]
    ca_cert: Option<PathBuf>,

    /// Do not trust the system certificate store
    #[arg(long)]
    ignore_system_ca: bool,

    /// Skip server certificate verification
    #[arg(long)]
    insecure: bool,

    #[arg(long)]
    max_redirects: Option<u32>,

    /// Request timeout, e.g. `30s` or `1m 30s`; `0s` disables it
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    timeout: Option<Duration>,

    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource
    Get(Target),
    /// POST a resource
    Create(Target),
    /// PUT a resource
    Update(Target),
    /// DELETE a resource
    Delete(Target),
    /// Print the effective configuration, secrets redacted
    Config,
}

#[derive(Args)]
struct Target {
    /// API path (relative to the server URL) or absolute URL
    path: String,

    /// JSON request body
    #[arg(short, long)]
    data: Option<String>,

    /// Extra header, as `Name: value`
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = effective_config(&cli)?;

    let (method, target) = match cli.command {
        Commands::Config => {
            for (name, value) in config.describe() {
                println!("{name:<18} {value}");
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Get(target) => (Method::GET, target),
        Commands::Create(target) => (Method::POST, target),
        Commands::Update(target) => (Method::PUT, target),
        Commands::Delete(target) => (Method::DELETE, target),
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    let endpoint = config.endpoint_url(&target.path)?;
    let client = HttpClient::new(config)?;

    let mut request = HttpRequest::new(method, endpoint);
    if let Some(data) = &target.data {
        let body: Value = serde_json::from_str(data)?;
        request = request.with_body(body);
    }
    for header in &target.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{header}', expected 'Name: value'"))?;
        request = request.header(name.trim(), value.trim());
    }

    let (cx, cancel) = Context::background().with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling request");
            cancel.cancel();
        }
    });

    let response = client.read_response(&cx, &request).await?;
    print_response(&response)?;

    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn effective_config(cli: &Cli) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ClientConfig::default(),
    };

    if let Some(url) = &cli.url {
        config.api_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.token_key = token.clone();
        config.access_key.clear();
        config.secret_key.clear();
    }
    if let Some(path) = &cli.ca_cert {
        config.ca_certs = std::fs::read_to_string(path)?;
    }
    config.ignore_system_ca |= cli.ignore_system_ca;
    config.insecure |= cli.insecure;
    if let Some(max) = cli.max_redirects {
        config.max_redirects = max;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }

    Ok(config)
}

fn print_response(response: &RawResponse) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("{}", response.status);

    if response.body.is_empty() {
        return Ok(());
    }
    match response.json::<Value>() {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", response.text()),
    }
    Ok(())
}
