//! fund-collector: entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use fund_collector::{Collector, CollectorConfig, SourceKind, YearRange};
use fund_collector_cli::{all_failed, export_outcomes, preview_lines, status_line, summary};

#[derive(Parser)]
#[command(
    name = "fund-collector",
    about = "Collect fund / investment-partnership disclosures and export them as CSV",
    version
)]
struct Cli {
    /// Path to a JSON config file.
    /// Also reads FUND_COLLECTOR_CONFIG, then ./fund-collector.json.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the selected sources and export one CSV per source.
    Collect {
        /// First registration year (inclusive).
        #[arg(long)]
        from: i32,

        /// Last registration year (inclusive).
        #[arg(long)]
        to: i32,

        /// Source to fetch; repeat for several. Defaults to vcs and dipa.
        #[arg(short, long = "source", value_parser = parse_source)]
        sources: Vec<SourceKind>,

        /// Directory for the CSV files.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Rows to preview per source (0 disables the preview).
        #[arg(long, default_value = "50")]
        preview: usize,

        /// Skip writing CSV files.
        #[arg(long)]
        no_export: bool,

        /// Print a JSON summary instead of status lines.
        #[arg(long)]
        json: bool,
    },

    /// List the known sources and their endpoints.
    Sources,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   fund-collector completions bash > ~/.local/share/bash-completion/completions/fund-collector
    ///   fund-collector completions zsh > ~/.zfunc/_fund-collector
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn parse_source(s: &str) -> Result<SourceKind, String> {
    s.parse().map_err(|e: fund_collector::FundError| e.to_string())
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Collect {
            from,
            to,
            sources,
            out_dir,
            preview,
            no_export,
            json,
        } => {
            let range = YearRange::new(from, to)?;
            let selection = if sources.is_empty() {
                vec![SourceKind::Vcs, SourceKind::Dipa]
            } else {
                sources
            };

            let config = CollectorConfig::resolve(cli.config.as_deref())?;
            let collector = Collector::new(config)?;
            let outcomes = collector.collect(&selection, range).await;

            if !json {
                for outcome in &outcomes {
                    let Some(records) = outcome.records() else {
                        continue;
                    };
                    println!("{}", status_line(outcome));
                    for line in preview_lines(records, preview) {
                        println!("  {line}");
                    }
                }
            }

            let mut exported = Vec::new();
            if !no_export {
                for (source, result) in export_outcomes(&out_dir, &outcomes) {
                    match result {
                        Ok(path) => {
                            exported.push((source.name().to_string(), path.display().to_string()))
                        }
                        Err(e) => eprintln!("export failed {source}: {e:#}"),
                    }
                }
            }

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary(&outcomes, range, &exported))?
                );
            } else {
                for outcome in outcomes.iter().filter(|o| !o.is_success()) {
                    eprintln!("{}", status_line(outcome));
                }
            }

            if all_failed(&outcomes) {
                std::process::exit(1);
            }
        }

        Commands::Sources => {
            let config = CollectorConfig::resolve(cli.config.as_deref())?;
            for kind in SourceKind::ALL {
                let source = config.source(kind);
                println!("{:<12} {}", kind.name(), kind.label());
                println!("{:<12} {}", "", source.base_url);
                if let Some(detail) = &source.detail_url {
                    println!("{:<12} {detail}", "");
                }
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "fund-collector", &mut std::io::stdout());
        }
    }

    Ok(())
}
