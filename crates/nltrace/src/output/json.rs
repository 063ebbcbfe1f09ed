//! JSON rendering.

use serde_json::{Map, Value as Json, json};

use super::{OutputOptions, Renderer, Value};
use crate::netlink::attr::NLA_TYPE_MASK;
use crate::util::addr::format_inet;
use crate::util::hexdump::format_hex;
use crate::xlat::{XlatStyle, c_hex};

enum Frame {
    Object { key: Option<String>, map: Map<String, Json> },
    Array { key: Option<String>, items: Vec<Json> },
}

/// Builds a `serde_json` tree from renderer calls.
///
/// Structures become objects and arrays become arrays. Members without a
/// name (an attribute's payload next to its header, for instance) are
/// placed in arrays, so every structure member is addressable by key.
#[derive(Default)]
pub struct JsonRenderer {
    opts: OutputOptions,
    stack: Vec<Frame>,
    pending_key: Option<String>,
    roots: Vec<Json>,
}

impl JsonRenderer {
    /// Create a renderer.
    pub fn new(opts: OutputOptions) -> Self {
        Self {
            opts,
            ..Default::default()
        }
    }

    /// Close any open containers and return everything rendered.
    ///
    /// A single top-level value is returned as is; several are wrapped in
    /// an array.
    pub fn finish(mut self) -> Json {
        while !self.stack.is_empty() {
            self.close();
        }
        match self.roots.len() {
            0 => Json::Null,
            1 => self.roots.remove(0),
            _ => Json::Array(self.roots),
        }
    }

    /// Serialize everything rendered, honouring `pretty`.
    pub fn into_string(self) -> crate::Result<String> {
        let pretty = self.opts.pretty;
        let json = self.finish();
        let s = if pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(s)
    }

    fn push(&mut self, value: Json) {
        let key = self.pending_key.take();
        match self.stack.last_mut() {
            Some(Frame::Object { map, .. }) => {
                let key = key.unwrap_or_else(|| format!("_{}", map.len()));
                map.insert(key, value);
            }
            Some(Frame::Array { items, .. }) => items.push(value),
            None => self.roots.push(value),
        }
    }

    fn close(&mut self) {
        let (key, value) = match self.stack.pop() {
            Some(Frame::Object { key, map }) => (key, Json::Object(map)),
            Some(Frame::Array { key, items }) => (key, Json::Array(items)),
            None => return,
        };
        self.pending_key = key;
        self.push(value);
    }

    fn to_json(&self, value: Value<'_>) -> Json {
        let style = self.opts.xlat_style;
        match value {
            Value::U(v) => json!(v),
            Value::X(v) => Json::String(c_hex(v)),
            Value::Sym(table, v) => match (style, table.lookup(v)) {
                (XlatStyle::Raw, _) | (_, None) => json!(v),
                (_, Some(name)) => json!(name),
            },
            Value::Flags { table, value, .. } => {
                if style == XlatStyle::Raw {
                    return json!(value);
                }
                let (names, rest) = table.decompose(value);
                let mut flags: Vec<Json> = names.into_iter().map(|n| json!(n)).collect();
                if rest != 0 {
                    flags.push(Json::String(c_hex(rest)));
                }
                Json::Array(flags)
            }
            Value::AttrType(table, raw) => {
                let kind = (raw & NLA_TYPE_MASK) as u64;
                match (style, table.lookup(kind)) {
                    (XlatStyle::Raw, _) | (_, None) => json!(raw),
                    (_, Some(name)) => json!(name),
                }
            }
            Value::Str { bytes, more } => {
                let mut s = String::from_utf8_lossy(bytes).into_owned();
                if more {
                    s.push_str("...");
                }
                Json::String(s)
            }
            Value::Bytes(bytes) => Json::String(format_hex(bytes)),
            Value::NetPort(port) => json!(port),
            Value::InetAddr { family, bytes } => match format_inet(family, bytes) {
                Some(addr) => Json::String(addr),
                None => Json::String(format_hex(bytes)),
            },
            Value::IfIndex(_, Some(name)) => json!(name),
            Value::IfIndex(index, None) => json!(index),
            Value::Cookie([lo, hi]) => json!(((hi as u64) << 32) | lo as u64),
        }
    }
}

impl Renderer for JsonRenderer {
    fn begin_struct(&mut self) {
        let key = self.pending_key.take();
        self.stack.push(Frame::Object {
            key,
            map: Map::new(),
        });
    }

    fn end_struct(&mut self) {
        self.close();
    }

    fn begin_array(&mut self) {
        let key = self.pending_key.take();
        self.stack.push(Frame::Array {
            key,
            items: Vec::new(),
        });
    }

    fn end_array(&mut self) {
        self.close();
    }

    fn next(&mut self) {}

    fn field_name(&mut self, name: &str) {
        self.pending_key = Some(name.to_string());
    }

    fn value(&mut self, value: Value<'_>) {
        let v = self.to_json(value);
        self.push(v);
    }

    fn indexed(&mut self, index: Value<'_>, value: Value<'_>) {
        let index = self.to_json(index);
        let value = self.to_json(value);
        self.push(json!({ "index": index, "value": value }));
    }

    fn raw(&mut self, bytes: &[u8], more: bool) {
        let mut s = format_hex(bytes).replace('\n', " ");
        if more {
            s.push_str(" ...");
        }
        self.push(json!({ "raw": s }));
    }

    fn address(&mut self, addr: u64) {
        self.push(json!({ "unreadable": format!("{:#x}", addr) }));
    }

    fn more_data(&mut self) {
        self.push(json!({ "truncated": true }));
    }

    fn more_data_at(&mut self, addr: u64) {
        self.push(json!({ "truncated": true, "unreadable": format!("{:#x}", addr) }));
    }

    fn unimplemented(&mut self, name: &str) {
        self.push(json!({ "unimplemented": name }));
    }

    fn xlat_style(&self) -> XlatStyle {
        self.opts.xlat_style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlat::tables::{ADDRFAMS, INET_DIAG_SHUTDOWN_FLAGS, SK_MEMINFO};

    #[test]
    fn test_nested_structs() {
        let mut out = JsonRenderer::default();
        out.begin_struct();
        out.field("idiag_family", Value::Sym(&ADDRFAMS, 2));
        out.next();
        out.field_name("id");
        out.begin_struct();
        out.field("idiag_sport", Value::NetPort(443));
        out.end_struct();
        out.end_struct();

        assert_eq!(
            out.finish(),
            json!({ "idiag_family": "AF_INET", "id": { "idiag_sport": 443 } })
        );
    }

    #[test]
    fn test_attr_pair_is_array() {
        let mut out = JsonRenderer::default();
        out.begin_array();
        out.begin_struct();
        out.field("nla_len", Value::U(8));
        out.end_struct();
        out.next();
        out.value(Value::U(42));
        out.end_array();

        assert_eq!(out.finish(), json!([{ "nla_len": 8 }, 42]));
    }

    #[test]
    fn test_flags_and_indexed() {
        let mut out = JsonRenderer::default();
        out.begin_array();
        out.value(Value::Flags {
            table: &INET_DIAG_SHUTDOWN_FLAGS,
            value: 23,
            verbose: true,
        });
        out.indexed(Value::Sym(&SK_MEMINFO, 1), Value::U(7));
        out.end_array();

        assert_eq!(
            out.finish(),
            json!([
                ["RCV_SHUTDOWN", "SEND_SHUTDOWN", "0x14"],
                { "index": "SK_MEMINFO_RCVBUF", "value": 7 }
            ])
        );
    }

    #[test]
    fn test_unclosed_containers_are_closed() {
        let mut out = JsonRenderer::default();
        out.begin_struct();
        out.field("a", Value::U(1));
        out.more_data();

        assert_eq!(out.finish(), json!({ "a": 1, "_1": { "truncated": true } }));
    }

    #[test]
    fn test_to_string_pretty() {
        let mut out = JsonRenderer::new(OutputOptions::default().pretty(true));
        out.value(Value::U(1));
        assert_eq!(out.into_string().unwrap(), "1");
    }
}
