use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{info, warn};
use proxifyre_store::{
    CONFIG_FILE, Error, LOG_LEVELS, PROBE_TIMEOUT, ProtocolChoice, ProxySettings,
    effective_endpoint, probe_endpoint, validate_syntax,
};

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the ProxiFyre config file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current configuration
    Show,
    /// Write a default configuration file
    Init,
    /// Check that the config file is valid JSON
    Check,
    /// Test TCP reachability of the proxy endpoint
    Probe {
        /// Endpoint to probe instead of the configured one
        endpoint: Option<String>,
        /// Connect timeout in milliseconds
        #[arg(long, default_value_t = PROBE_TIMEOUT.as_millis() as u64)]
        timeout_ms: u64,
    },
    /// Set the log level
    LogLevel { level: String },
    /// Set the SOCKS5 proxy endpoint
    Endpoint { endpoint: String },
    /// Set the supported protocols (TCP, UDP or TCP+UDP)
    Protocols { choice: ProtocolChoice },
    /// Append applications to the proxied list
    Add { names: Vec<String> },
    /// Remove an application from the proxied list
    Remove { name: String },
}

async fn run(args: Args) -> proxifyre_store::Result<()> {
    match args.command {
        Command::Show => {
            let settings = ProxySettings::load(&args.config)?;
            print_settings(&settings);
        }
        Command::Init => {
            ProxySettings::default().save(&args.config)?;
            println!("wrote {}", args.config.display());
        }
        Command::Check => {
            validate_syntax(&args.config)?;
            println!("{} is valid JSON", args.config.display());
        }
        Command::Probe {
            endpoint,
            timeout_ms,
        } => {
            let raw = match endpoint {
                Some(ep) => ep,
                None => ProxySettings::load(&args.config)?.endpoint,
            };
            let endpoint = effective_endpoint(&raw);
            let echoed = probe_endpoint(&endpoint, Duration::from_millis(timeout_ms)).await?;
            println!("proxy reachable ({echoed})");
        }
        Command::LogLevel { level } => {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(Error::Format(format!(
                    "log level must be one of {}",
                    LOG_LEVELS.join(", ")
                )));
            }
            edit(&args.config, |settings| settings.log_level = level)?;
        }
        Command::Endpoint { endpoint } => {
            edit(&args.config, |settings| settings.endpoint = endpoint)?;
        }
        Command::Protocols { choice } => {
            edit(&args.config, |settings| settings.protocol = choice)?;
        }
        Command::Add { names } => {
            edit(&args.config, |settings| {
                settings.app_names.extend(names);
            })?;
        }
        Command::Remove { name } => {
            edit(&args.config, |settings| {
                let before = settings.app_names.len();
                settings.app_names.retain(|n| n != &name);
                if settings.app_names.len() == before {
                    warn!("{name} was not in the app list");
                }
            })?;
        }
    }
    Ok(())
}

/// Load, mutate in memory, write back. Every edit goes through the same
/// normalize-on-load, expand-on-save path.
fn edit(path: &Path, apply: impl FnOnce(&mut ProxySettings)) -> proxifyre_store::Result<()> {
    let mut settings = ProxySettings::load(path)?;
    apply(&mut settings);
    settings.save(path)?;
    info!("updated {}", path.display());
    Ok(())
}

fn print_settings(settings: &ProxySettings) {
    println!("logLevel:            {}", settings.log_level);
    println!("socks5ProxyEndpoint: {}", settings.endpoint);
    println!("supportedProtocols:  {}", settings.protocol);
    println!("appNames ({}):", settings.app_names.len());
    for name in &settings.app_names {
        println!("  {name}");
    }
}
