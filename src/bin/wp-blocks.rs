//! wp-blocks — inspect the block structure of WordPress post content.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wp_block_parse::{ParseOptions, get_blocks_with, has_blocks, parse_with_options};

#[derive(Parser)]
#[command(name = "wp-blocks")]
#[command(version, about = "Parse WordPress block markup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the blocks of a document as JSON
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print every parsed node, free text included, without normalization
        #[arg(long)]
        raw: bool,
    },

    /// Exit successfully if the document contains a block
    HasBlocks {
        /// Input file (`-` or absent for stdin)
        file: Option<PathBuf>,
    },

    /// Print an outline of the block tree
    Tree {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file (`-` or absent for stdin)
    file: Option<PathBuf>,

    /// Maximum block nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Maximum input size in bytes
    #[arg(long)]
    max_input_len: Option<usize>,
}

impl InputArgs {
    fn options(&self) -> ParseOptions {
        let defaults = ParseOptions::default();
        ParseOptions {
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            max_input_len: self.max_input_len.unwrap_or(defaults.max_input_len),
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wp_block_parse=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input, pretty, raw } => {
            let text = read_input(input.file.as_ref())?;
            let options = input.options();
            let json = if raw {
                let result = parse_with_options(&text, &options)?;
                for diagnostic in &result.diagnostics {
                    eprintln!("{diagnostic}");
                }
                to_json(&result.blocks, pretty)?
            } else {
                to_json(&get_blocks_with(&text, &options)?, pretty)?
            };
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::HasBlocks { file } => {
            let text = read_input(file.as_ref())?;
            let found = has_blocks(&text);
            println!("{found}");
            Ok(if found { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Tree { input } => {
            let text = read_input(input.file.as_ref())?;
            let result = parse_with_options(&text, &input.options())?;
            for diagnostic in &result.diagnostics {
                eprintln!("{diagnostic}");
            }
            let blocks = wp_block_parse::normalize_blocks(result.blocks);
            print!("{}", wp_block_parse::render_term::to_terminal(&blocks));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
