use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{Result, eyre};
use seavoice_bedrock::stream::BedrockSource;
use seavoice_core::models::language::Language;
use seavoice_core::models::persona::Persona;
use seavoice_interpreter::session::ChatSession;
use seavoice_storage::slots::SlotStore;
use tracing_subscriber::EnvFilter;

mod app;
mod aws;
mod commands;
mod config;
mod render;
mod surface;
mod trivia;

use app::App;
use config::{CredentialSource, DEFAULT_MODEL_ID, SeaVoiceConfig};
use surface::Surface;

/// Ask questions about ocean float data and get answers with charts.
#[derive(Parser)]
#[command(name = "seavoice", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where saved sessions and the trivia high score live.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the AWS region, model and credentials to use.
    Configure {
        #[arg(long)]
        region: String,
        #[arg(long, default_value = DEFAULT_MODEL_ID)]
        model_id: String,
        /// Use a named profile from the shared AWS config.
        #[arg(long, conflicts_with_all = ["access_key_id", "secret_access_key"])]
        profile: Option<String>,
        #[arg(long, requires = "secret_access_key")]
        access_key_id: Option<String>,
        #[arg(long, requires = "access_key_id")]
        secret_access_key: Option<String>,
        #[arg(long, requires = "access_key_id")]
        session_token: Option<String>,
    },
    /// Data explorer with filters, visualizations and export.
    Explore {
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Text-only chat.
    Chat {
        /// summarizer or conversational
        #[arg(long, default_value = "conversational")]
        persona: Persona,
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Ten questions of ocean trivia.
    Trivia {
        #[arg(long, default_value = "en")]
        language: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    if let Commands::Configure {
        region,
        model_id,
        profile,
        access_key_id,
        secret_access_key,
        session_token,
    } = cli.command
    {
        let credentials = match (profile, access_key_id, secret_access_key) {
            (Some(profile_name), _, _) => CredentialSource::Profile { profile_name },
            (None, Some(access_key_id), Some(secret_access_key)) => CredentialSource::Inline {
                access_key_id,
                secret_access_key,
                session_token,
            },
            _ => CredentialSource::DefaultChain,
        };
        let config = SeaVoiceConfig::new(&region, &model_id, credentials);
        config.validate()?;
        config::save_config(&config_path, &config)?;
        println!("Saved {}", config_path.display());
        println!("{}", config.describe());
        return Ok(());
    }

    let config = config::load_config(&config_path)?;
    tracing::info!(config = %config.describe(), "loaded config");
    let sdk_config = aws::build_aws_config(&config.region, &config.credentials).await;
    let source = BedrockSource::new(&sdk_config, &config.model_id);
    let store = match cli.data_dir {
        Some(dir) => SlotStore::new(dir),
        None => SlotStore::default_location()?,
    };
    let mut app = App::new(source, store);

    match cli.command {
        Commands::Explore { language } => {
            let session = ChatSession::new(Persona::DomainExpert, Language::from_code_or_default(&language));
            surface::run(&mut app, session, Surface::Explorer).await
        }
        Commands::Chat { persona, language } => {
            if !matches!(persona, Persona::Summarizer | Persona::Conversational) {
                return Err(eyre!("chat supports the summarizer and conversational personas, not {persona}"));
            }
            let session = ChatSession::new(persona, Language::from_code_or_default(&language));
            surface::run(&mut app, session, Surface::Chat).await
        }
        Commands::Trivia { language } => {
            trivia::run(&mut app, Language::from_code_or_default(&language)).await
        }
        Commands::Configure { .. } => Ok(()),
    }
}
