use clap::{Parser, Subcommand};
use company_screener::cli::commands::generate::ReportFormat;
use company_screener::cli::ui::Output;
use company_screener::config::ConfigLoader;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "company-screener")]
#[command(
    version,
    about = "Company research reports from data providers and an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Configuration file (TOML)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, help = "Bind host (overrides config)")]
        host: Option<String>,
        #[arg(long, short, help = "Bind port (overrides config)")]
        port: Option<u16>,
    },

    /// Generate one report and print it
    Generate {
        #[arg(help = "Company website URL")]
        url: String,
        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
        #[arg(long, short, help = "Write the report to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcompany-screener encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let out = Output::quiet(cli.quiet);
    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = Runtime::new()?;
            rt.block_on(company_screener::cli::commands::serve::run(
                config, host, port, &out,
            ))?;
        }
        Commands::Generate {
            url,
            format,
            output,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(company_screener::cli::commands::generate::run(
                &config,
                &url,
                format,
                output.as_deref(),
                &out,
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                company_screener::cli::commands::config::show(&config, &format)?;
            }
            ConfigAction::Path => {
                company_screener::cli::commands::config::path()?;
            }
        },
    }

    Ok(())
}
