//! OCSF Schema CLI
//!
//! Query the OCSF schema server from the command line.

use clap::{Parser, Subcommand};
use ocsf_api::{ClientConfig, OcsfApiClient, VersionSelector};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ocsf-api")]
#[command(about = "Query the OCSF schema server")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the server base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List published versions
    Versions,

    /// Fetch a schema
    Schema {
        /// Version, "latest" or "latest_stable" (default: server default)
        version: Option<VersionSelector>,

        /// Include profiles
        #[arg(long)]
        profiles: bool,

        /// Include extensions
        #[arg(long)]
        extensions: bool,

        /// Print counts instead of the full document
        #[arg(long)]
        summary: bool,
    },

    /// List profiles for a version
    Profiles {
        version: String,
    },

    /// List extensions for a version
    Extensions {
        version: String,
    },

    /// View or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration as TOML
    Show,

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "ocsf.toml")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::load_from(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.server.base_url = base_url;
    }

    match cli.command {
        Commands::Versions => {
            let client = OcsfApiClient::new(config)?;
            let versions = client.get_version_set()?;
            let latest = versions.latest().ok().map(|v| v.version().to_string());
            let stable = versions.latest_stable().ok().map(|v| v.version().to_string());

            println!("📚 Published versions:");
            for v in versions.sorted() {
                let mut markers = Vec::new();
                if v == versions.default_version() {
                    markers.push("default");
                }
                if latest.as_deref() == Some(v.version()) {
                    markers.push("latest");
                }
                if stable.as_deref() == Some(v.version()) {
                    markers.push("latest stable");
                }
                if markers.is_empty() {
                    println!("  {}", v);
                } else {
                    println!("  {} ({})", v, markers.join(", "));
                }
            }
        }

        Commands::Schema { version, profiles, extensions, summary } => {
            config.fetch.profiles |= profiles;
            config.fetch.extensions |= extensions;
            let client = OcsfApiClient::new(config)?;
            let schema = client.get_schema(version.unwrap_or_default())?;

            if summary {
                println!("📋 OCSF schema {}", schema.version);
                println!("  Classes: {}", schema.classes.len());
                println!("  Objects: {}", schema.objects.len());
                if let Some(p) = &schema.profiles {
                    println!("  Profiles: {}", p.len());
                }
                if let Some(e) = &schema.extensions {
                    println!("  Extensions: {}", e.len());
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
        }

        Commands::Profiles { version } => {
            let client = OcsfApiClient::new(config)?;
            for (name, profile) in client.get_profiles(&version)? {
                println!("  {} ({} attributes)", name, profile.attributes.len());
            }
        }

        Commands::Extensions { version } => {
            let client = OcsfApiClient::new(config)?;
            for (name, ext) in client.get_extensions(&version)? {
                let caption = ext.caption.as_deref().unwrap_or("");
                match ext.uid {
                    Some(uid) => println!("  {} [{}] {}", name, uid, caption),
                    None => println!("  {} {}", name, caption),
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Init { output } => {
                ClientConfig::default().save(&output)?;
                println!("✅ Created config file: {}", output);
            }
        },
    }

    Ok(())
}
