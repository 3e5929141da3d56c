use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memmapctl::cmd_format;
use memmapctl::cmd_header::{self, HeaderArgs};
use memmapctl::cmd_summary;
use memmapctl::cmd_validate;

#[derive(Parser, Debug)]
#[command(name = "memmapctl", version, about = "IP-XACT memory map CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Validate every memory map and address space in a document
    Validate {
        file: PathBuf,
        /// Additional remap state to accept (repeatable)
        #[arg(long = "remap-state")]
        remap_states: Vec<String>,
    },
    /// Generate a C header with register and memory defines
    Header {
        file: PathBuf,
        /// Memory map to generate, all maps when omitted
        #[arg(long)]
        map: Option<String>,
        /// Prefix for every define
        #[arg(long, default_value = "")]
        prefix: String,
        /// Prefix register defines with their address block name
        #[arg(long)]
        block_prefix: bool,
        /// Offset added to every address (IP-XACT numeric literal)
        #[arg(long, default_value = "0")]
        offset: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-serialise a memory map or address space document
    Format {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 4)]
        indent: usize,
    },
    /// Address ranges and name checks per memory map
    Summary { file: PathBuf },
}

fn main() -> Result<()> {
    let Cli { verbose, json, cmd } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd {
        Cmd::Validate { file, remap_states } => cmd_validate::run(&file, &remap_states, json)?,
        Cmd::Header {
            file,
            map,
            prefix,
            block_prefix,
            offset,
            output,
        } => {
            let args = HeaderArgs {
                file,
                map,
                prefix,
                block_prefix,
                offset,
                output,
            };
            cmd_header::run(args)?
        }
        Cmd::Format {
            file,
            output,
            indent,
        } => cmd_format::run(&file, output.as_deref(), indent)?,
        Cmd::Summary { file } => cmd_summary::run(&file, json)?,
    };

    Ok(())
}
