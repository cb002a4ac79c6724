use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use flags::{ActionFlag, OutputFormat};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tfplan_extractor::{decode_payload, PlanAnalyzer, ResourceFilter};
use tfplan_protocol::{response_schema, serialize_json, serialize_json_pretty};

mod config;
mod flags;
mod http_api;
mod report;

pub use config::{AppConfig, ServerConfig};
pub use http_api::{build_router, HttpState, HEALTH_PATH, UPLOAD_PATH};

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
#[command(name = "tfplan")]
#[command(about = "Recover and summarize Terraform plan JSON from messy input", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file with [extractor] and [server] sections (env: TFPLAN_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Count each object at most once in the action tally (env: TFPLAN_STRICT_TALLY)
    #[arg(long, global = true)]
    strict_tally: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a plan, log or fragment dump and count resource actions
    Classify(ClassifyArgs),

    /// List the resource changes of a full plan
    Resources(ResourcesArgs),

    /// Print the JSON schema of the classify response
    Schema,

    /// Serve the upload API over HTTP (POST /api/upload)
    #[command(name = "serve-http")]
    ServeHttp(ServeArgs),
}

#[derive(Args)]
struct ClassifyArgs {
    /// Input file, or `-` for stdin (default: stdin)
    path: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Args)]
struct ResourcesArgs {
    /// Input file, or `-` for stdin (default: stdin)
    path: Option<PathBuf>,

    /// Keep only resources with this effective action
    #[arg(long, value_enum)]
    action: Option<ActionFlag>,

    /// Keep only resources of this provider (e.g. `aws`)
    #[arg(long)]
    provider: Option<String>,

    /// Keep only resources of this type (e.g. `aws_instance`)
    #[arg(long = "type")]
    resource_type: Option<String>,

    /// Case-insensitive substring of the resource address
    #[arg(long)]
    query: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:5000
    #[arg(long)]
    bind: Option<String>,

    /// Allowed browser origin; repeat for several (replaces configured origins)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Largest accepted upload in bytes
    #[arg(long)]
    max_upload_bytes: Option<usize>,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Auto-enable quiet mode for JSON output (keeps stdout clean for parsing)
    let json_output = match &cli.command {
        Commands::Classify(args) => args.format == OutputFormat::Json,
        Commands::Resources(_) | Commands::Schema => true,
        Commands::ServeHttp(_) => false,
    };
    if json_output {
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

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.strict_tally {
        config.extractor.strict_tally = true;
    }

    match cli.command {
        Commands::Classify(args) => run_classify(args, &config)?,
        Commands::Resources(args) => run_resources(args, &config)?,
        Commands::Schema => run_schema()?,
        Commands::ServeHttp(args) => serve_http(args, config).await?,
    }

    Ok(())
}

fn run_classify(args: ClassifyArgs, config: &AppConfig) -> Result<()> {
    let analyzer = PlanAnalyzer::new(config.extractor.clone())?;
    let bytes = read_input(args.path.as_deref())?;
    let response = analyzer.analyze_bytes(&bytes)?;

    let output = match args.format {
        OutputFormat::Text => report::render_summary(&response),
        OutputFormat::Json if args.pretty => serialize_json_pretty(&response)?,
        OutputFormat::Json => serialize_json(&response)?,
    };
    print_stdout(&output)
}

fn run_resources(args: ResourcesArgs, config: &AppConfig) -> Result<()> {
    let analyzer = PlanAnalyzer::new(config.extractor.clone())?;
    let text = decode_payload(&read_input(args.path.as_deref())?);
    let filter = ResourceFilter {
        action: args.action.map(ActionFlag::as_domain),
        provider: args.provider,
        resource_type: args.resource_type,
        query: args.query,
    };

    if let Some(action) = filter.action {
        log::debug!("listing {action} resources only");
    }

    let listing = analyzer.resources(&text, &filter)?;
    log::debug!("{} resources matched", listing.resources.len());
    let output = if args.pretty {
        serialize_json_pretty(&listing)?
    } else {
        serialize_json(&listing)?
    };
    print_stdout(&output)
}

fn run_schema() -> Result<()> {
    print_stdout(&serialize_json_pretty(&response_schema()?)?)
}

async fn serve_http(args: ServeArgs, mut config: AppConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if !args.cors_origins.is_empty() {
        config.server.cors_origins = args.cors_origins;
    }
    if let Some(limit) = args.max_upload_bytes {
        anyhow::ensure!(limit > 0, "--max-upload-bytes must be > 0");
        config.server.max_upload_bytes = limit;
    }

    let analyzer = PlanAnalyzer::new(config.extractor.clone())?;
    let app = build_router(HttpState::new(analyzer), &config.server)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving upload API: {base_url}{UPLOAD_PATH}"))?;
    print_stdout(&format!("Health endpoint: {base_url}{HEALTH_PATH}"))?;
    if !config.server.cors_origins.is_empty() {
        log::info!("CORS origins: {}", config.server.cors_origins.join(", "));
    }
    print_stdout(&format!(
        "Try: curl -F 'file=@plan.json' {base_url}{UPLOAD_PATH}"
    ))?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
