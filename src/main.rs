//! Recap CLI - Video summarisation with Gemini
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::{bail, Context};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use recap::summary::labeled_summary;
use recap::{logging, markdown, Config, ContentDescriptor, DetailLevel, ExportBundle, Summarizer};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "recap")]
#[command(author, version, about = "Summarise videos with Gemini", long_about = None)]
struct Cli {
    /// Path to a recap.toml (defaults to ./recap.toml or ~/.config/recap/recap.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log every model attempt
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a video from its metadata
    Summarise(SummariseArgs),
    /// Render Markdown to HTML
    Render {
        /// Markdown file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// List candidate models in the order they are tried
    Models,
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Args)]
struct SummariseArgs {
    /// Video title
    #[arg(long, required_unless_present = "from_json")]
    title: Option<String>,
    /// Video URL
    #[arg(long, required_unless_present = "from_json")]
    url: Option<String>,
    /// Video description
    #[arg(long, conflicts_with = "description_file")]
    description: Option<String>,
    /// Read the description from a file
    #[arg(long)]
    description_file: Option<PathBuf>,
    /// Detail level, overriding config and JSON input
    #[arg(long, value_enum, ignore_case = true)]
    detail: Option<DetailLevel>,
    /// Read the whole descriptor as JSON from a file, or `-` for stdin
    #[arg(long, conflicts_with_all = ["title", "url"])]
    from_json: Option<String>,
    /// Print rendered HTML instead of Markdown
    #[arg(long)]
    html: bool,
    /// Also write summary.html and summary.md into this directory
    #[arg(long)]
    out: Option<PathBuf>,
}

impl SummariseArgs {
    /// Build the descriptor from JSON input or from the individual flags.
    fn descriptor(&self, default_detail: DetailLevel) -> anyhow::Result<ContentDescriptor> {
        let mut descriptor = match &self.from_json {
            Some(source) => {
                let raw = read_input(source)?;
                serde_json::from_str::<ContentDescriptor>(&raw)
                    .context("failed to parse content descriptor JSON")?
            }
            None => {
                let (Some(title), Some(url)) = (&self.title, &self.url) else {
                    bail!("--title and --url are required without --from-json");
                };
                let description = match &self.description_file {
                    Some(path) => Some(
                        std::fs::read_to_string(path)
                            .with_context(|| format!("failed to read {}", path.display()))?,
                    ),
                    None => self.description.clone(),
                };
                ContentDescriptor::new(title.clone(), url.clone(), description, default_detail)
            }
        };
        if let Some(level) = self.detail {
            descriptor.detail_level = level;
        }
        Ok(descriptor)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Summarise(args) => {
            let config = load_config(cli.config.as_deref())?;
            let descriptor = args.descriptor(config.summary.detail)?;

            let credential = config.credential()?;
            let summarizer = Summarizer::from_config(&config)?;

            eprintln!(
                "{} {} ({} detail)",
                "Summarising".cyan().bold(),
                descriptor.title,
                descriptor.detail_level
            );
            let result = summarizer
                .summarize(&descriptor, credential, &config)
                .await?;
            if result.is_empty() {
                eprintln!("{} {} returned an empty summary", "Warning:".yellow().bold(), result.model_used);
            }

            let labeled = labeled_summary(&descriptor, &result);
            let bundle = ExportBundle::from_markdown(&labeled);

            if args.html {
                println!("{}", bundle.html);
            } else {
                println!("{}", bundle.plain);
            }

            if let Some(dir) = &args.out {
                let (html_path, md_path) = bundle.write_to(dir)?;
                eprintln!(
                    "{} {} and {}",
                    "Exported".green().bold(),
                    html_path.display(),
                    md_path.display()
                );
            }
        }
        Commands::Render { input } => {
            let text = read_input(&input)?;
            println!("{}", markdown::render(&text));
        }
        Commands::Models => {
            let config = load_config(cli.config.as_deref())?;
            if config.models.is_empty() {
                println!("No candidate models configured.");
            } else {
                println!("Candidate models ({}):\n", config.models.len());
                for (i, model) in config.models.iter().enumerate() {
                    println!("  {}. {}", i + 1, model);
                }
            }
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Read a file, or stdin when `source` is `-`
fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source))
}
