//! nl-decode - render NETLINK_SOCK_DIAG buffers.
//!
//! Reads a buffer either as a hex dump (from a file or stdin) or straight
//! out of a running process, and prints it the way a syscall tracer shows
//! `sendmsg`/`recvmsg` payloads on a `NETLINK_SOCK_DIAG` socket.

mod output;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use nltrace::netlink::{DecodeOptions, Direction, ForeignMemory, LocalMemory, ProcessMemory};
use nltrace::output::{OutputFormat, OutputOptions, XlatStyle};
use nltrace::sockdiag::{INET_DIAG_MSG_ATTRS, INET_DIAG_REQ_ATTRS};
use nltrace::util::{IfNameResolver, NoIfNames, SysfsIfNames, parse_hex};

use output::{Layout, Settings};

#[derive(Parser)]
#[command(name = "nl-decode", version, about = "Decode NETLINK_SOCK_DIAG buffers")]
struct Cli {
    /// Hex dump to decode ("-" or nothing for stdin).
    input: Option<PathBuf>,

    /// Read the buffer from this process instead of a hex dump.
    #[arg(short = 'p', long, requires_all = ["addr", "len"])]
    pid: Option<u32>,

    /// Address of the buffer (base address of a hex dump).
    #[arg(short = 'a', long, value_parser = parse_addr)]
    addr: Option<u64>,

    /// Length of the buffer (defaults to the hex dump size).
    #[arg(short = 'l', long)]
    len: Option<usize>,

    /// What the buffer holds.
    #[arg(short = 'k', long, value_enum, default_value_t = Kind::Messages)]
    kind: Kind,

    /// Which side of the socket the buffer was captured on.
    #[arg(short = 'd', long, value_enum, default_value_t = Side::Auto)]
    direction: Side,

    /// How constants are shown.
    #[arg(short = 'X', long, value_enum, default_value_t = Xlat::Abbrev)]
    xlat: Xlat,

    /// Cap on strings, raw dumps and array elements.
    #[arg(short = 's', long, default_value_t = nltrace::netlink::DEFAULT_MAX_STRLEN)]
    max_strlen: usize,

    /// Print everything, ignoring --max-strlen.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Don't resolve interface indices to names.
    #[arg(short = 'n', long)]
    numeric: bool,

    /// Output in JSON format.
    #[arg(short = 'j', long)]
    json: bool,

    /// Pretty print JSON output.
    #[arg(long, requires = "json")]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    /// Netlink messages.
    Messages,
    /// INET_DIAG response attributes.
    MsgAttrs,
    /// INET_DIAG request attributes.
    ReqAttrs,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    /// Decide per message from NLM_F_REQUEST.
    Auto,
    /// Sent to the kernel.
    Request,
    /// Received from the kernel.
    Response,
}

#[derive(Clone, Copy, ValueEnum)]
enum Xlat {
    /// Names only.
    Abbrev,
    /// Numbers only.
    Raw,
    /// Numbers with names in comments.
    Verbose,
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn read_dump(input: Option<&PathBuf>) -> anyhow::Result<Vec<u8>> {
    let text = match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("cannot read stdin")?;
            text
        }
    };
    Ok(parse_hex(&text)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let layout = match cli.kind {
        Kind::Messages => Layout::Messages(match cli.direction {
            Side::Auto => Direction::Auto,
            Side::Request => Direction::Request,
            Side::Response => Direction::Response,
        }),
        Kind::MsgAttrs => Layout::Attrs(&INET_DIAG_MSG_ATTRS),
        Kind::ReqAttrs => Layout::Attrs(&INET_DIAG_REQ_ATTRS),
    };
    let settings = Settings {
        decode: DecodeOptions::new()
            .max_strlen(cli.max_strlen)
            .verbose(cli.verbose)
            .resolve_ifnames(!cli.numeric),
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        output: OutputOptions::default()
            .xlat_style(match cli.xlat {
                Xlat::Abbrev => XlatStyle::Abbrev,
                Xlat::Raw => XlatStyle::Raw,
                Xlat::Verbose => XlatStyle::Verbose,
            })
            .pretty(cli.pretty),
        layout,
    };

    let ifnames: Box<dyn IfNameResolver> = if cli.numeric {
        Box::new(NoIfNames)
    } else {
        Box::new(SysfsIfNames::new())
    };

    let (mem, addr, len): (Box<dyn ForeignMemory>, u64, usize) = match cli.pid {
        Some(pid) => {
            if cli.input.is_some() {
                bail!("a hex dump cannot be combined with --pid");
            }
            let (Some(addr), Some(len)) = (cli.addr, cli.len) else {
                bail!("--pid needs --addr and --len");
            };
            let mem = ProcessMemory::new(pid).with_context(|| format!("process {}", pid))?;
            (Box::new(mem), addr, len)
        }
        None => {
            let bytes = read_dump(cli.input.as_ref())?;
            let addr = cli.addr.unwrap_or(0);
            let len = cli.len.unwrap_or(bytes.len());
            tracing::debug!(addr, len, captured = bytes.len(), "decoding hex dump");
            (Box::new(LocalMemory::new(addr, bytes)), addr, len)
        }
    };

    let rendered = output::render(mem.as_ref(), ifnames.as_ref(), &settings, addr, len)?;
    println!("{}", rendered);
    Ok(())
}
