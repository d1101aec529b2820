use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use env_logger::Env;
use hound_formats::record::RECORD_FILE_NAME;
use hound_formats::{BuildHeader, read_build_header, scan_build_folders};
use serde::Serialize;

/// Print the header of build records (name, build date, payload offset).
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Record files or `.mcd` build folders to inspect
    #[arg(value_name = "PATH", conflicts_with = "root")]
    paths: Vec<PathBuf>,

    /// Folder whose `.mcd` subdirectories are all inspected
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Emit one JSON object per line instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct DumpLine<'a> {
    path: &'a Path,
    #[serde(flatten)]
    header: &'a BuildHeader,
    payload_start: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let headers = collect_headers(&args)?;
    if headers.is_empty() {
        bail!("no build records found");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (path, header) in &headers {
        if args.json {
            let line = DumpLine {
                path,
                header,
                payload_start: header.payload_start(),
            };
            serde_json::to_writer(&mut out, &line)?;
            writeln!(out)?;
        } else {
            writeln!(
                out,
                "{name:<16} {date}  payload @ {offset:>6}  {path}",
                name = header.name,
                date = header.built_at.format("%Y-%m-%d %H:%M:%S"),
                offset = header.payload_start(),
                path = path.display()
            )?;
        }
    }

    Ok(())
}

fn collect_headers(args: &Args) -> Result<Vec<(PathBuf, BuildHeader)>> {
    if let Some(root) = args.root.as_ref() {
        let mut headers = Vec::new();
        for scanned in scan_build_folders(root) {
            match scanned.record {
                Ok(record) => headers.push((record.path, record.header)),
                // Already reported through `log::warn!` by the scan.
                Err(_) => continue,
            }
        }
        return Ok(headers);
    }

    args.paths
        .iter()
        .map(|path| {
            let file = if path.is_dir() {
                path.join(RECORD_FILE_NAME)
            } else {
                path.clone()
            };
            let header = read_build_header(&file)
                .with_context(|| format!("reading build header from {}", file.display()))?;
            Ok((file, header))
        })
        .collect()
}
