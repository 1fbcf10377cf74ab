use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use construct_analytics::{
    AnalyticsConfig, AnalyticsEncoder, ConstructInfo, MetadataResource, PayloadFormat,
};
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "construct-analytics")]
#[command(about = "Encode construct usage for deployment metadata", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON list of {fqn, version} into an analytics string
    Encode(EncodeArgs),

    /// Decode an analytics string back into a JSON list of {fqn, version}
    Decode(DecodeArgs),

    /// Render the deployment metadata resource for a JSON list of {fqn, version}
    Resource(ResourceArgs),
}

#[derive(Args)]
struct EncodeArgs {
    /// JSON file with the construct list (stdin when omitted or "-")
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Always emit the plaintext variant
    #[arg(long)]
    force_plaintext: bool,

    /// TOML file with encoder settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit a JSON object with the analytics string and its format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ResourceArgs {
    /// JSON file with the construct list (stdin when omitted or "-")
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Always emit the plaintext variant
    #[arg(long)]
    force_plaintext: bool,

    /// TOML file with encoder settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct DecodeArgs {
    /// Analytics string (`v2:<format>:<payload>`)
    analytics: Option<String>,

    /// File holding the analytics string (stdin when neither is given)
    #[arg(short, long, conflicts_with = "analytics")]
    input: Option<PathBuf>,

    /// TOML file with decoder settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct EncodeOutput {
    analytics: String,
    format: PayloadFormat,
    constructs: usize,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers.
    if matches!(&cli.command, Commands::Encode(args) if args.json) {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Encode(args) => run_encode(&args),
        Commands::Decode(args) => run_decode(&args),
        Commands::Resource(args) => run_resource(&args),
    }
}

fn run_encode(args: &EncodeArgs) -> Result<()> {
    let encoder = build_encoder(args.config.as_deref(), args.force_plaintext)?;
    let infos = read_constructs(args.input.as_deref())?;
    let encoded = encoder.encode(&infos);
    log::info!(
        "Encoded {} constructs as {} ({} bytes)",
        infos.len(),
        encoded.format,
        encoded.payload.len()
    );

    if args.json {
        let output = EncodeOutput {
            analytics: encoded.to_string(),
            format: encoded.format,
            constructs: infos.len(),
        };
        print_stdout(&serde_json::to_string(&output)?)
    } else {
        print_stdout(&encoded.to_string())
    }
}

fn run_decode(args: &DecodeArgs) -> Result<()> {
    let encoder = build_encoder(args.config.as_deref(), false)?;
    let analytics = match (&args.analytics, &args.input) {
        (Some(raw), _) => raw.clone(),
        (None, path) => {
            let raw = read_input(path.as_deref(), "analytics string")?;
            strip_line_ending(&raw).to_string()
        }
    };
    let infos = encoder
        .decode(&analytics)
        .context("Failed to decode analytics string")?;
    log::debug!("Decoded {} constructs", infos.len());
    print_stdout(&serde_json::to_string_pretty(&infos)?)
}

fn run_resource(args: &ResourceArgs) -> Result<()> {
    let encoder = build_encoder(args.config.as_deref(), args.force_plaintext)?;
    let infos = read_constructs(args.input.as_deref())?;
    let resource = MetadataResource::from_infos(&infos, &encoder);
    let fragment = resource
        .to_template_fragment()
        .context("Failed to render metadata resource")?;
    print_stdout(&serde_json::to_string_pretty(&fragment)?)
}

fn build_encoder(config_path: Option<&Path>, force_plaintext: bool) -> Result<AnalyticsEncoder> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => AnalyticsConfig::default(),
    };
    if force_plaintext || env_truthy("CONSTRUCT_ANALYTICS_FORCE_PLAINTEXT") {
        config.force_plaintext = true;
    }
    log::debug!("Encoder config: {config:?}");
    AnalyticsEncoder::new(config).context("Invalid analytics configuration")
}

fn load_config(path: &Path) -> Result<AnalyticsConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn read_constructs(path: Option<&Path>) -> Result<Vec<ConstructInfo>> {
    let raw = read_input(path, "construct list")?;
    serde_json::from_str(&raw).context("Construct list must be a JSON array of {fqn, version}")
}

fn read_input(path: Option<&Path>, what: &str) -> Result<String> {
    if let Some(path) = path.filter(|p| p.as_os_str() != "-") {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read {what} from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .with_context(|| format!("Failed to read {what} from stdin"))?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Input is empty. Provide --input or pipe the {what} via stdin.");
    }

    Ok(buffer)
}

/// Drop the newline a file or pipe ends with; FQNs may end in spaces
fn strip_line_ending(raw: &str) -> &str {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    raw.strip_suffix('\r').unwrap_or(raw)
}

fn env_truthy(var: &str) -> bool {
    env::var(var)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
