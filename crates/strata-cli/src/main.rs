//! strata command-line tool.
//!
//! Builds a mount table and runs one VFS operation against it.
//!
//! Usage:
//!   # Mount table from ~/.config/strata/mounts.toml (if present)
//!   strata mounts
//!
//!   # Ad-hoc mounts: POINT=DIR[:PRIORITY][:ro], or POINT=@memory
//!   strata --mount /data=./assets:ro --mount /data=./mods:penetrant ls /data
//!   strata --config game.toml cat /data/autoexec.cfg
//!   echo "volume=3" | strata --mount /cfg=./cfg put /cfg/sound.cfg

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use strata_vfs::{
    FileSystem, MountConfig, MountPriority, OpenMode, VfsConfig, VfsStat, WriteMode,
};

/// Query and modify a priority-tiered virtual filesystem.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Query and modify a priority-tiered virtual filesystem")]
struct Cli {
    /// Mount table to load (default: ~/.config/strata/mounts.toml if it exists)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Extra mount: POINT=DIR[:PRIORITY][:ro] or POINT=@memory
    #[arg(short, long = "mount", value_name = "SPEC", global = true)]
    mounts: Vec<String>,

    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List mounts in resolution order
    Mounts,
    /// List a directory
    Ls { path: String },
    /// Print a file to stdout
    Cat { path: String },
    /// Show size, type and access bits
    Stat {
        path: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write stdin to a file
    Put {
        path: String,
        /// Append instead of overwriting
        #[arg(long)]
        append: bool,
    },
    /// Report whether a path is readable and writable
    Check { path: String },
}

/// Machine-readable stat output.
#[derive(Debug, Serialize)]
struct StatReport<'a> {
    path: &'a str,
    mount_point: Option<String>,
    kind: &'static str,
    size: u64,
    readable: bool,
    writable: bool,
    mtime: u64,
}

impl<'a> StatReport<'a> {
    fn new(fs: &FileSystem, path: &'a str, stat: &VfsStat) -> Self {
        let kind = if stat.is_dir() {
            "directory"
        } else if stat.is_file() {
            "file"
        } else {
            "other"
        };
        Self {
            path,
            mount_point: stat
                .mount
                .and_then(|id| fs.mount_info(id))
                .map(|info| info.mount_point),
            kind,
            size: stat.size,
            readable: stat.is_readable(),
            writable: stat.is_writable(),
            mtime: stat
                .mtime
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }
}

/// Parse `POINT=DIR[:PRIORITY][:ro]` or `POINT=@memory[:...]`.
fn parse_mount_spec(spec: &str) -> Result<MountConfig> {
    let Some((point, rest)) = spec.split_once('=') else {
        bail!("mount spec {spec:?} is missing '='");
    };
    let mut parts = rest.split(':');
    let source = parts.next().unwrap_or_default();
    if source.is_empty() {
        bail!("mount spec {spec:?} has no source");
    }

    let mut config = if source == "@memory" {
        MountConfig::memory(point)
    } else {
        MountConfig::directory(point, source)
    };

    for option in parts {
        if option.eq_ignore_ascii_case("ro") {
            config = config.with_read_only(true);
        } else if let Some(priority) = MountPriority::from_str(option) {
            config = config.with_priority(priority);
        } else {
            bail!("unknown mount option {option:?} in {spec:?}");
        }
    }
    Ok(config)
}

fn build_filesystem(cli: &Cli) -> Result<FileSystem> {
    let mut config = match &cli.config {
        Some(path) => VfsConfig::load(path)
            .with_context(|| format!("loading mount table {}", path.display()))?,
        None => match VfsConfig::default_path().filter(|path| path.exists()) {
            Some(path) => {
                tracing::info!(path = %path.display(), "using default mount table");
                VfsConfig::load(&path)
                    .with_context(|| format!("loading mount table {}", path.display()))?
            }
            None => VfsConfig::default(),
        },
    };

    for spec in &cli.mounts {
        config.mounts.push(parse_mount_spec(spec)?);
    }
    if config.mounts.is_empty() {
        tracing::warn!("no mounts configured; every lookup will fail");
    }

    Ok(config.build()?)
}

fn run(cli: &Cli, input: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    let fs = build_filesystem(cli)?;

    match &cli.command {
        Command::Mounts => {
            for info in fs.mounts() {
                writeln!(
                    out,
                    "{:<24}{:<12}{}{}",
                    info.priority.as_str(),
                    info.id.to_string(),
                    info.mount_point,
                    if info.read_only { " (ro)" } else { "" }
                )?;
            }
        }
        Command::Ls { path } => {
            for name in fs.listdir(path).with_context(|| format!("ls {path}"))? {
                writeln!(out, "{name}")?;
            }
        }
        Command::Cat { path } => {
            let mut stream = fs
                .open(path, OpenMode::Read, WriteMode::Ignore)
                .with_context(|| format!("cat {path}"))?;
            io::copy(&mut stream, out)?;
        }
        Command::Stat { path, json } => {
            let stat = fs.stat(path).with_context(|| format!("stat {path}"))?;
            let report = StatReport::new(&fs, path, &stat);
            if *json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(out, "path:     {}", report.path)?;
                writeln!(out, "mount:    {}", report.mount_point.as_deref().unwrap_or("?"))?;
                writeln!(out, "kind:     {}", report.kind)?;
                writeln!(out, "size:     {}", report.size)?;
                writeln!(out, "readable: {}", report.readable)?;
                writeln!(out, "writable: {}", report.writable)?;
                writeln!(out, "mtime:    {}", report.mtime)?;
            }
        }
        Command::Put { path, append } => {
            let write_mode = if *append {
                WriteMode::Append
            } else {
                WriteMode::Overwrite
            };
            let mut data = Vec::new();
            input.read_to_end(&mut data)?;
            let mut stream = fs
                .open(path, OpenMode::Write, write_mode)
                .with_context(|| format!("put {path}"))?;
            stream.write_all(&data)?;
            stream.flush()?;
            tracing::info!(path = %path, bytes = data.len(), "wrote file");
        }
        Command::Check { path } => {
            writeln!(out, "readable: {}", fs.file_readable(path))?;
            writeln!(out, "writable: {}", fs.file_writable(path))?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&cli, &mut stdin.lock(), &mut stdout.lock())
}
