use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::CodecLimits;
use glob::Pattern;
use ottd_tools::{
    decode_capture, format_decode_pretty, inspect_capture, parse_capture, InspectReport,
};
use protocols::Endpoint;
use schema::{Direction, PacketTable};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "ottd-tools",
    version,
    about = "OpenTTD packet capture inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone, Copy)]
struct TableArgs {
    /// Protocol the capture was taken from.
    #[arg(long, value_enum, default_value_t = ProtocolArg::Admin)]
    protocol: ProtocolArg,
    /// Direction seen from the capturing side.
    #[arg(long, value_enum, default_value_t = DirectionArg::Recv)]
    direction: DirectionArg,
}

#[derive(Subcommand)]
enum Command {
    /// Print the packet table for a protocol and direction.
    List {
        #[command(flatten)]
        table: TableArgs,
    },
    /// Decode a frame capture into structured JSON.
    Decode {
        /// Path to the capture.
        capture: PathBuf,
        #[command(flatten)]
        table: TableArgs,
        /// Starting protocol version (defaults to the protocol's version).
        #[arg(long)]
        version: Option<u32>,
        /// The capture is hex text rather than binary.
        #[arg(long)]
        hex: bool,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Frame statistics for every capture in a directory.
    Inspect {
        /// Directory holding captures.
        dir: PathBuf,
        #[command(flatten)]
        table: TableArgs,
        /// Optional glob filter on file names.
        #[arg(long)]
        glob: Option<String>,
        /// The captures are hex text rather than binary.
        #[arg(long)]
        hex: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProtocolArg {
    Admin,
    Query,
    Master,
}

impl ProtocolArg {
    const fn endpoint(self) -> Endpoint {
        match self {
            Self::Admin => Endpoint::ADMIN,
            Self::Query => Endpoint::SERVER_QUERY,
            Self::Master => Endpoint::MASTER_SERVER,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Send,
    Recv,
    Both,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Send => Self::Send,
            DirectionArg::Recv => Self::Recv,
            DirectionArg::Both => Self::Both,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List { table } => {
            let (_, table) = load_table(table)?;
            println!("{} {} ({} packets)", table.protocol(), table.direction(), table.len());
            for (id, schema) in table.iter() {
                let fields: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
                println!("  {id:>3} {:<20} {}", schema.name(), fields.join(", "));
            }
        }
        Command::Decode {
            capture,
            table,
            version,
            hex,
            format,
        } => {
            let (endpoint, table) = load_table(table)?;
            let bytes = read_capture(&capture, hex)?;
            let mut ctx = endpoint.context();
            if let Some(version) = version {
                ctx.set_version(version);
            }
            let output = decode_capture(
                &bytes,
                &table,
                &mut ctx,
                &wire::Limits::default(),
                &CodecLimits::default(),
            );
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    println!("{}", format_decode_pretty(&output));
                }
            }
        }
        Command::Inspect {
            dir,
            table,
            glob,
            hex,
        } => {
            let (_, table) = load_table(table)?;
            for path in collect_captures(&dir, glob.as_deref())? {
                let bytes = read_capture(&path, hex)?;
                let report = inspect_capture(&bytes, &table, &wire::Limits::default());
                println!("== {} ({} bytes) ==", path.display(), bytes.len());
                print_inspect_report(&report);
            }
        }
    }
    Ok(())
}

fn load_table(args: TableArgs) -> Result<(Endpoint, PacketTable)> {
    let registry = protocols::registry().context("build protocol registry")?;
    let endpoint = args.protocol.endpoint();
    let table = registry.table(endpoint.protocol, args.direction.into());
    debug!(endpoint = endpoint.name, packets = table.len(), "loaded packet table");
    Ok((endpoint, table))
}

fn read_capture(path: &Path, hex: bool) -> Result<Vec<u8>> {
    let raw = fs::read(path).with_context(|| format!("read capture {}", path.display()))?;
    parse_capture(&raw, hex).with_context(|| format!("parse capture {}", path.display()))
}

fn collect_captures(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_name && !pattern.matches_path(&path) {
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "frames: {} ({} bytes), trailing: {} bytes",
        report.frames, report.frame_bytes, report.trailing_bytes
    );
    for packet in &report.packets {
        let name = packet.name.as_deref().unwrap_or("<unknown>");
        println!(
            "  {:>3} {name:<20} x{} ({} bytes)",
            packet.packet_id, packet.count, packet.bytes
        );
    }
    if let Some(error) = &report.error {
        println!("stopped: {error}");
    }
}
