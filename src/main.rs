use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use isctl::bulk::{
    BulkMutator, JsonLinesReporter, LicenseTier, ManagementMode, Mutation, MutationKind,
    MutationParams,
};
use isctl::commands::{self, DeviceClaim};
use isctl::config::{Config, Overrides, Settings};
use isctl::intersight::auth::KeyFileCredentials;
use isctl::intersight::client::IntersightClient;
use isctl::intersight::http::format_api_error;
use isctl::resource::{get_all_resource_keys, get_resource};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for the Intersight API
#[derive(Parser, Debug)]
#[command(name = "isctl", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// API key id used to sign requests
    #[arg(long, global = true)]
    api_key_id: Option<String>,

    /// Path to the API secret key (PEM)
    #[arg(long, global = true)]
    secret_key_file: Option<PathBuf>,

    /// API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the raw listing of a collection
    Get {
        /// Resource key, see `isctl resources`
        resource: String,
    },

    /// List the known resource keys
    Resources,

    /// Assign a management mode to every blade and rack unit
    AssignMode {
        #[arg(long, value_enum)]
        mode: Option<ManagementMode>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Tag every blade and rack unit with a license tier
    ApplyLicense {
        #[arg(long, value_enum)]
        tier: Option<LicenseTier>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Claim a device with its serial number and claim code
    Claim {
        #[arg(long)]
        device_id: Option<String>,

        #[arg(long)]
        claim_id: Option<String>,
    },

    /// Create one of the default policies
    CreateDefault {
        #[arg(value_enum)]
        policy: DefaultPolicy,
    },

    /// Store credentials and defaults in the config file
    Configure {
        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct BatchArgs {
    /// Mutation requests in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Give up on the mutation phase after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DefaultPolicy {
    Bios,
    Boot,
    Ntp,
}

impl DefaultPolicy {
    fn template_key(self) -> &'static str {
        match self {
            DefaultPolicy::Bios => "bios",
            DefaultPolicy::Boot => "boot",
            DefaultPolicy::Ntp => "ntp",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("isctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("isctl").join("isctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".isctl").join("isctl.log");
    }
    PathBuf::from("isctl.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<isctl::Error>() {
                Some(api_err) => {
                    tracing::error!("{:?}", api_err);
                    eprintln!("Error: {}", format_api_error(api_err));
                }
                None => eprintln!("Error: {err:?}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();
    let overrides = |batch: &BatchArgs| Overrides {
        api_key_id: args.api_key_id.clone(),
        secret_key_file: args.secret_key_file.clone(),
        base_url: args.base_url.clone(),
        concurrency: batch.concurrency,
        deadline_secs: batch.deadline_secs,
    };

    match &args.command {
        Command::Resources => {
            for key in get_all_resource_keys() {
                let name = get_resource(key).map(|r| r.display_name.as_str()).unwrap_or("");
                println!("{:<28} {}", key, name);
            }
            Ok(())
        }
        Command::Configure { batch } => {
            let mut config = config;
            config.update(overrides(batch).into());
            config.save()?;
            if let Some(path) = Config::config_path() {
                println!("Configuration saved to {}", path.display());
            }
            Ok(())
        }
        Command::Get { resource } => {
            if get_resource(resource).is_none() {
                return Err(isctl::Error::Configuration(format!(
                    "unknown resource: {}. See `isctl resources`",
                    resource
                ))
                .into());
            }
            let client = connect(&config.resolve(overrides(&BatchArgs::default()))?)?;
            print_json(&commands::get(&client, resource).await?)
        }
        Command::Claim {
            device_id,
            claim_id,
        } => {
            let claim = DeviceClaim::new(device_id.clone(), claim_id.clone())?;
            let client = connect(&config.resolve(overrides(&BatchArgs::default()))?)?;
            print_json(&commands::claim(&client, &claim).await?)
        }
        Command::CreateDefault { policy } => {
            let client = connect(&config.resolve(overrides(&BatchArgs::default()))?)?;
            print_json(&commands::create_default(&client, policy.template_key()).await?)
        }
        Command::AssignMode { mode, batch } => {
            let params = MutationParams {
                mode: *mode,
                tier: None,
            };
            // Parameter check comes before credentials are even read
            let mutation = MutationKind::AssignManagementMode.validate(params)?;
            run_batch(mutation, &config.resolve(overrides(batch))?).await
        }
        Command::ApplyLicense { tier, batch } => {
            let params = MutationParams {
                mode: None,
                tier: *tier,
            };
            let mutation = MutationKind::ApplyLicense.validate(params)?;
            run_batch(mutation, &config.resolve(overrides(batch))?).await
        }
    }
}

/// Build a signed client from resolved settings
fn connect(settings: &Settings) -> Result<IntersightClient> {
    let credentials =
        KeyFileCredentials::from_file(&settings.api_key_id, &settings.secret_key_file)?;
    tracing::info!(
        "Using API key {} against {}",
        credentials.api_key_id(),
        settings.base_url
    );
    Ok(IntersightClient::new(&settings.base_url, Arc::new(credentials))?)
}

async fn run_batch(mutation: Mutation, settings: &Settings) -> Result<()> {
    let client = connect(settings)?;

    let mut reporter = JsonLinesReporter::stdout();
    BulkMutator::new(&client)
        .with_concurrency(settings.concurrency)
        .with_deadline(settings.deadline)
        .apply(mutation, &mut reporter)
        .await?;
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
