//! `tree-patch`: decode a patch document and print its normalized form.
//!
//! Usage:
//!   tree-patch [--strict] [--dag] [--instruction] [FILE]
//!
//! The document is read from FILE, or stdin when FILE is omitted. Log
//! output is controlled with `RUST_LOG`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tree_patch::{parse_bytes_with, parse_instruction_bytes_with, to_wire, ParseOptions};
use tree_patch_codec::{Encoder, JsonCodec};

#[derive(Debug, Parser)]
#[command(
    name = "tree-patch",
    version,
    about = "Decode tree patch operations and print them normalized."
)]
struct Cli {
    /// Input document (default: stdin).
    file: Option<PathBuf>,

    /// Require a value for add/replace/test and from for move/copy.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Read and write DAG-JSON (links as {"/": cid}).
    #[arg(long, default_value_t = false)]
    dag: bool,

    /// The document is an Instruction rather than an operation sequence.
    #[arg(long, default_value_t = false)]
    instruction: bool,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let input = read_input(cli.file.as_ref())?;
    let codec = if cli.dag {
        JsonCodec::dag()
    } else {
        JsonCodec::plain()
    };
    let options = ParseOptions {
        require_operands: cli.strict,
    };

    let output = if cli.instruction {
        let instruction =
            parse_instruction_bytes_with(&input, &codec, &options).context("parse instruction")?;
        info!(
            start_at = %instruction.start_at,
            operations = instruction.operations.len(),
            "parsed instruction"
        );
        instruction.to_node().context("encode instruction")?
    } else {
        let operations = parse_bytes_with(&input, &codec, &options).context("parse operations")?;
        info!(operations = operations.len(), "parsed operation sequence");
        to_wire(&operations).context("encode operations")?
    };

    let mut stdout = io::stdout().lock();
    codec
        .pretty()
        .encode(&output, &mut stdout)
        .context("write output")?;
    writeln!(stdout)?;
    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path).with_context(|| format!("read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("read stdin")?;
            Ok(buf)
        }
    }
}
