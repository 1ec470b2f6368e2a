use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serialink_frame::{Frame, Request};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    schema_id: &'a str,
    request: String,
    role: &'a str,
    action: u8,
    tagged: bool,
    payload_size: usize,
    payload: String,
    source: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct WireOutput<'a> {
    schema_id: &'a str,
    request: String,
    length: u8,
    checksum: String,
    wire: String,
}

pub fn print_frame(frame: &Frame, source: &str, format: OutputFormat) {
    let request = frame.request_info();
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                schema_id: "https://schemas.3leaps.dev/serialink/cli/v1/frame-received.schema.json",
                request: byte_label(frame.request),
                role: request.role().name(),
                action: request.action(),
                tagged: request.has_header_tag(),
                payload_size: frame.payload.len(),
                payload: hex::encode(frame.payload.as_ref()),
                source,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["REQUEST", "ROLE", "ACTION", "SIZE", "SOURCE", "PAYLOAD"])
                .add_row(vec![
                    byte_label(frame.request),
                    request.role().name().to_string(),
                    request.action().to_string(),
                    frame.payload.len().to_string(),
                    source.to_string(),
                    hex::encode(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "request={} size={} source={} payload={}",
                request,
                frame.payload.len(),
                source,
                hex::encode(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

/// Print the encoded bytes of one frame.
pub fn print_wire(wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WireOutput {
                schema_id: "https://schemas.3leaps.dev/serialink/cli/v1/frame-encoded.schema.json",
                request: byte_label(wire[0]),
                length: wire[1],
                checksum: byte_label(wire[wire.len() - 1]),
                wire: hex::encode(wire),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["REQUEST", "LENGTH", "CHECKSUM", "WIRE"])
                .add_row(vec![
                    Request::from(wire[0]).to_string(),
                    wire[1].to_string(),
                    byte_label(wire[wire.len() - 1]),
                    hex::encode(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let spaced: Vec<String> = wire.iter().map(|b| format!("{b:02x}")).collect();
            println!("{}", spaced.join(" "));
        }
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn byte_label(byte: u8) -> String {
    format!("{byte:#04x}")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_labels_are_prefixed_hex() {
        assert_eq!(byte_label(0xD5), "0xd5");
        assert_eq!(byte_label(0x01), "0x01");
    }

    #[test]
    fn frame_output_serializes() {
        let frame = Frame::new(0xD3, vec![0x01, 0x02]);
        let request = frame.request_info();
        let out = FrameOutput {
            schema_id: "test",
            request: byte_label(frame.request),
            role: request.role().name(),
            action: request.action(),
            tagged: request.has_header_tag(),
            payload_size: frame.payload.len(),
            payload: hex::encode(frame.payload.as_ref()),
            source: "unit",
            timestamp: "0".to_string(),
        };

        let json: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert_eq!(json["request"], "0xd3");
        assert_eq!(json["role"], "slave");
        assert_eq!(json["action"], 3);
        assert_eq!(json["payload"], "0102");
    }
}
