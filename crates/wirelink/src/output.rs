use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wirelink_frame::{DecoderStats, Message};

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
struct MessageOutput {
    session: u16,
    is_response: bool,
    payload_size: usize,
    payload: String,
}

pub fn print_message(message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                session: message.session,
                is_response: message.is_response,
                payload_size: message.payload.len(),
                payload: payload_preview(message.payload.as_ref()),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SESSION", "KIND", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    message.session.to_string(),
                    kind(message).to_string(),
                    message.payload.len().to_string(),
                    payload_preview(message.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "session={} kind={} size={} payload={}",
                message.session,
                kind(message),
                message.payload.len(),
                payload_preview(message.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(message.payload.as_ref());
        }
    }
}

pub fn print_stats(stats: &DecoderStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "frames_ok": stats.frames_ok,
                    "frames_crc_err": stats.frames_crc_err,
                    "frames_resync": stats.frames_resync,
                    "messages_ok": stats.messages_ok,
                    "messages_dropped": stats.messages_dropped,
                })
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "FRAMES OK",
                    "CRC ERR",
                    "RESYNC",
                    "MESSAGES OK",
                    "DROPPED",
                ])
                .add_row(vec![
                    stats.frames_ok.to_string(),
                    stats.frames_crc_err.to_string(),
                    stats.frames_resync.to_string(),
                    stats.messages_ok.to_string(),
                    stats.messages_dropped.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "frames: {} ok, {} crc errors, {} resyncs; messages: {} ok, {} dropped",
                stats.frames_ok,
                stats.frames_crc_err,
                stats.frames_resync,
                stats.messages_ok,
                stats.messages_dropped
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

/// Hex dump with 16 bytes per row, offset-prefixed.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in data.chunks(16).enumerate() {
        out.push_str(&format!("{:08x} ", row * 16));
        for byte in chunk {
            out.push_str(&format!(" {byte:02x}"));
        }
        out.push('\n');
    }
    out
}

fn kind(message: &Message) -> &'static str {
    if message.is_response {
        "response"
    } else {
        "request"
    }
}
