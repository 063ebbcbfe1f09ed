//! Rendering of one decode run in the selected format.

use nltrace::netlink::{
    DecodeCtx, DecodeOptions, Direction, ForeignMemory, Registry, decode_nlattr, decode_sock_diag,
};
use nltrace::output::{JsonRenderer, OutputFormat, OutputOptions, Renderer, TextRenderer};
use nltrace::util::IfNameResolver;
use serde::Serialize;

/// What the buffer holds.
#[derive(Clone, Copy)]
pub enum Layout {
    /// A sequence of netlink messages.
    Messages(Direction),
    /// A bare attribute stream for `registry`.
    Attrs(&'static Registry),
}

/// Everything selected on the command line that shapes the output.
pub struct Settings {
    pub decode: DecodeOptions,
    pub format: OutputFormat,
    pub output: OutputOptions,
    pub layout: Layout,
}

/// One decoded buffer, as printed with `--json`.
#[derive(Serialize)]
struct Report {
    addr: String,
    len: usize,
    decoded: serde_json::Value,
}

fn decode(
    mem: &dyn ForeignMemory,
    out: &mut dyn Renderer,
    opts: &DecodeOptions,
    ifnames: &dyn IfNameResolver,
    addr: u64,
    len: usize,
    layout: Layout,
) {
    let mut ctx = DecodeCtx::new(mem, out, opts, ifnames);
    match layout {
        Layout::Messages(direction) => decode_sock_diag(&mut ctx, addr, len, direction),
        Layout::Attrs(registry) => decode_nlattr(&mut ctx, addr, len, registry),
    }
}

/// Decode `len` bytes at `addr` and return the printable result.
pub fn render(
    mem: &dyn ForeignMemory,
    ifnames: &dyn IfNameResolver,
    settings: &Settings,
    addr: u64,
    len: usize,
) -> anyhow::Result<String> {
    let opts = &settings.decode;
    let out_opts = settings.output;
    let layout = settings.layout;
    match settings.format {
        OutputFormat::Text => {
            let mut out = TextRenderer::new(out_opts);
            decode(mem, &mut out, opts, ifnames, addr, len, layout);
            Ok(out.finish())
        }
        OutputFormat::Json => {
            let mut out = JsonRenderer::new(out_opts);
            decode(mem, &mut out, opts, ifnames, addr, len, layout);
            let report = Report {
                addr: format!("{:#x}", addr),
                len,
                decoded: out.finish(),
            };
            let s = if out_opts.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            Ok(s)
        }
    }
}
