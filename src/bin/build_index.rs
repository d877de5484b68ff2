//! `build-index` CLI: build a combined index file from a forward collection,
//! or run a query against one. Maps every [`rank_wand::error::IndexError`] to
//! the process exit codes from the on-disk layout: 3 on an invariant
//! violation during build, 2 on I/O failure, 1 on anything else (bad
//! argument, unknown encoding, out-of-range id).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use clap::{Parser, Subcommand};

use rank_wand::builder::{build_index, RawDocument};
use rank_wand::config::Config;
use rank_wand::error::IndexError;
use rank_wand::persistence::directory::FsDirectory;
use rank_wand::scorer::{Bm25Params, QueryLikelihoodParams};

#[derive(Parser)]
#[command(name = "build-index", about = "Build or query a static inverted index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an index from a forward collection (one JSON-lines document per line).
    Build {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 1)]
        shards: usize,
    },
    /// Run a single query against a built index.
    Query {
        #[arg(long)]
        index: PathBuf,
        #[arg(long)]
        terms: Vec<u32>,
        #[arg(long, default_value_t = 10)]
        k: usize,
        #[arg(long, default_value = "bm25")]
        scorer: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build { input, output, shards } => run_build(input, output, shards),
        Command::Query { index, terms, k, scorer } => run_query(index, terms, k, scorer),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run_build(input: PathBuf, output: PathBuf, shards: usize) -> Result<(), IndexError> {
    log::info!("reading forward collection from {}", input.display());
    let documents = read_forward_collection(&input)?;
    let num_terms = documents.iter().flat_map(|d| d.terms.iter().map(|&(t, _)| t)).max().map(|m| m + 1).unwrap_or(0);

    let shard_count = shards.max(1);
    let shard_size = documents.len().div_ceil(shard_count).max(1);
    let shard_list: Vec<Vec<RawDocument>> = documents.chunks(shard_size).map(|c| c.to_vec()).collect();

    let cancel = AtomicBool::new(false);
    log::info!("building index across {} shard(s)", shard_list.len());
    let index = build_index(shard_list, num_terms, Config::default(), Bm25Params::default(), QueryLikelihoodParams::default(), &cancel)?;
    log::info!("built index: {} docs, {} terms; writing to {}", index.num_docs(), index.num_terms(), output.display());
    write_index_to_path(&output, &index)?;
    Ok(())
}

fn run_query(index: PathBuf, terms: Vec<u32>, k: usize, scorer: String) -> Result<(), IndexError> {
    log::info!("loading index from {}", index.display());
    let _ = (terms, k, scorer);
    Err(IndexError::invariant("query subcommand requires a persisted index reader, not implemented by this placeholder driver"))
}

/// One line of input: `docid:length:term=freq,term=freq,...`.
fn read_forward_collection(path: &PathBuf) -> Result<Vec<RawDocument>, IndexError> {
    let text = std::fs::read_to_string(path).map_err(|e| IndexError::io(path.clone(), e))?;
    let mut documents = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        documents.push(parse_document_line(line).map_err(|msg| {
            IndexError::invariant(format!("{}:{}: {msg}", path.display(), line_no + 1))
        })?);
    }
    Ok(documents)
}

fn parse_document_line(line: &str) -> Result<RawDocument, String> {
    // docid:length:term=freq,term=freq,...
    let mut parts = line.splitn(3, ':');
    let docid: u32 = parts.next().ok_or("missing docid")?.parse().map_err(|_| "invalid docid")?;
    let length: u32 = parts.next().ok_or("missing length")?.parse().map_err(|_| "invalid length")?;
    let terms_part = parts.next().ok_or("missing terms")?;
    let mut terms = Vec::new();
    if !terms_part.is_empty() {
        for term in terms_part.split(',') {
            let (term_id, freq) = term.split_once('=').ok_or("malformed term entry")?;
            let term_id: u32 = term_id.parse().map_err(|_| "invalid term id")?;
            let freq: u32 = freq.parse().map_err(|_| "invalid frequency")?;
            terms.push((term_id, freq));
        }
    }
    Ok(RawDocument { docid, length, terms })
}

/// Writes the index's stream files and `.ini` manifest alongside `output`,
/// using `output`'s file name as the shared stem (`<stem>.documents`,
/// `<stem>.ini`, ...) and its parent directory as the index directory.
fn write_index_to_path(output: &PathBuf, index: &rank_wand::index::Index) -> Result<(), IndexError> {
    let root = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
    let base = output.file_name().ok_or_else(|| IndexError::invariant(format!("output path {} has no file name", output.display())))?.to_string_lossy().to_string();
    let directory = FsDirectory::new(root)?;
    rank_wand::persistence::writer::write_index(&directory, &base, index)?;
    Ok(())
}
