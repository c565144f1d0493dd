//! Prometheus PDF - Entry point
//!
//! Runs the MCP server on stdio by default, or one PDF operation from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Run as MCP server (default)
//! prometheus-pdf
//! prometheus-pdf serve
//!
//! # One-off operations
//! prometheus-pdf info book.pdf
//! prometheus-pdf split book.pdf -p 25 -o parts/
//! prometheus-pdf extract book.pdf -t 4000 -o chunks.json
//! prometheus-pdf extract-range book.pdf 10 20 --json
//! ```

mod output;

use clap::{Parser, Subcommand};
use prometheus_pdf::config::{LogFormat, ServerConfig};
use prometheus_pdf::operations::{
    extract_range, extract_text, get_pdf_info, split_pdf, ExtractionOptions, SplitOptions,
    ToolOutcome,
};
use prometheus_pdf::run_server_with_config;
use prometheus_pdf::text::load_token_counter;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Prometheus PDF: split large PDFs and extract token-aware text chunks.
#[derive(Parser)]
#[command(name = "prometheus-pdf", version, about)]
struct Cli {
    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Show PDF information and processing estimates
    Info {
        /// Path to the PDF file
        pdf: PathBuf,
    },

    /// Split a PDF into smaller PDF files
    Split {
        /// Path to the PDF file
        pdf: PathBuf,
        /// Pages per chunk
        #[arg(short = 'p', long = "pages", default_value_t = 20)]
        pages: u32,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// File name prefix
        #[arg(long, default_value = "chunk")]
        prefix: String,
    },

    /// Extract text in token-aware chunks
    Extract {
        /// Path to the PDF file
        pdf: PathBuf,
        /// Maximum tokens per chunk
        #[arg(short = 't', long = "tokens", default_value_t = 8000)]
        tokens: usize,
        /// Save the full result to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep the extracted text as-is, without cleaning
        #[arg(long)]
        raw: bool,
        /// Leave out the `--- Page N ---` markers
        #[arg(long)]
        no_page_numbers: bool,
    },

    /// Extract a page range as a new PDF
    ExtractRange {
        /// Path to the PDF file
        pdf: PathBuf,
        /// First page (1-indexed)
        start: u32,
        /// Last page (inclusive)
        end: u32,
        /// Output PDF path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("prometheus_pdf={}", config.tracing_directive()))
    });
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries MCP frames and command output
    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Print a command result and map it to an exit status.
fn finish<T: Serialize>(
    json: bool,
    result: prometheus_pdf::Result<T>,
    human: impl FnOnce(&T) -> String,
) -> ExitCode {
    match result {
        Ok(report) => {
            if json {
                println!("{}", output::format_json(&ToolOutcome::Success(&report)));
            } else {
                println!("{}", human(&report));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            if json {
                let outcome: ToolOutcome<()> = ToolOutcome::Error {
                    error: e.client_message(),
                };
                println!("{}", output::format_json(&outcome));
            } else {
                eprintln!("Error: {}", e.client_message());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, json: bool, config: ServerConfig) -> anyhow::Result<ExitCode> {
    let config = &config;
    let code = match command {
        Command::Serve => {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                "Starting Prometheus PDF MCP server"
            );
            run_server_with_config(config.clone()).await?;
            ExitCode::SUCCESS
        }
        Command::Info { pdf } => {
            let display = pdf.display().to_string();
            finish(json, get_pdf_info(&pdf, config), |report| {
                output::format_info(&display, report)
            })
        }
        Command::Split {
            pdf,
            pages,
            output: output_dir,
            prefix,
        } => {
            let options = SplitOptions {
                pages_per_chunk: pages,
                output_dir,
                prefix,
            };
            finish(json, split_pdf(&pdf, &options, config), output::format_split)
        }
        Command::Extract {
            pdf,
            tokens,
            output: save_to,
            raw,
            no_page_numbers,
        } => {
            let options = ExtractionOptions {
                max_tokens_per_chunk: tokens,
                include_page_numbers: !no_page_numbers,
                clean_text: !raw,
            };
            let counter = load_token_counter(&config.tokenizer_encoding);
            let result = extract_text(&pdf, &options, counter.as_ref(), config).and_then(|report| {
                if let Some(path) = &save_to {
                    std::fs::write(path, output::format_json(&ToolOutcome::Success(&report)))?;
                }
                Ok(report)
            });
            finish(json, result, |report| {
                let mut text = output::format_extraction(report);
                if let Some(path) = &save_to {
                    text.push_str(&format!("\nSaved to: {}\n", path.display()));
                }
                text
            })
        }
        Command::ExtractRange {
            pdf,
            start,
            end,
            output: output_file,
        } => finish(
            json,
            extract_range(&pdf, start, end, output_file.as_deref(), config),
            output::format_range,
        ),
    };
    Ok(code)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    init_tracing(&config);

    run(cli.command.unwrap_or(Command::Serve), cli.json, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::try_parse_from(["prometheus-pdf"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::try_parse_from([
            "prometheus-pdf",
            "extract",
            "book.pdf",
            "-t",
            "4000",
            "--raw",
            "--no-page-numbers",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Command::Extract {
                tokens,
                raw,
                no_page_numbers,
                output,
                ..
            }) => {
                assert_eq!(tokens, 4000);
                assert!(raw);
                assert!(no_page_numbers);
                assert!(output.is_none());
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_extract_range_args() {
        let cli =
            Cli::try_parse_from(["prometheus-pdf", "extract-range", "a.pdf", "3", "9", "-o", "x.pdf"])
                .unwrap();
        match cli.command {
            Some(Command::ExtractRange {
                start, end, output, ..
            }) => {
                assert_eq!((start, end), (3, 9));
                assert_eq!(output, Some(PathBuf::from("x.pdf")));
            }
            _ => panic!("expected extract-range"),
        }
    }

    #[test]
    fn test_split_defaults() {
        let cli = Cli::try_parse_from(["prometheus-pdf", "split", "a.pdf"]).unwrap();
        match cli.command {
            Some(Command::Split { pages, prefix, .. }) => {
                assert_eq!(pages, 20);
                assert_eq!(prefix, "chunk");
            }
            _ => panic!("expected split"),
        }
    }
}
