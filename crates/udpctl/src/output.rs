use std::io::{IsTerminal, Write};
use std::net::SocketAddr;
use std::time::Duration;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use udpctl_frame::{is_response, Command, ControlMessage, MessageId};
use udpctl_log::{format_timestamp, AuditLog, LogEntry, LogKind};

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
struct MessageOutput<'a> {
    id: u16,
    id_hex: String,
    name: &'a str,
    response: bool,
    data_len: u8,
    format_version: u8,
    security_number: u16,
    reserved: u16,
    verification: u16,
    payload_hex: String,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rtt_us: Option<u128>,
}

/// Print one received frame.
pub fn print_message(
    message: &ControlMessage,
    source: SocketAddr,
    rtt: Option<Duration>,
    format: OutputFormat,
) {
    let name = message.name().unwrap_or("UNKNOWN");
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                id: message.id,
                id_hex: format!("0x{:04X}", message.id),
                name,
                response: is_response(message.id),
                data_len: message.data_len,
                format_version: message.format_version,
                security_number: message.security_number,
                reserved: message.reserved,
                verification: message.verification,
                payload_hex: hex(&message.payload),
                source: source.to_string(),
                rtt_us: rtt.map(|d| d.as_micros()),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "LEN", "VER", "SOURCE", "RTT"])
                .add_row(vec![
                    format!("0x{:04X}", message.id),
                    name.to_string(),
                    message.data_len.to_string(),
                    message.format_version.to_string(),
                    source.to_string(),
                    rtt.map(|d| format!("{d:?}")).unwrap_or_else(|| "-".to_string()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let rtt = rtt.map(|d| format!(" rtt={d:?}")).unwrap_or_default();
            println!(
                "id=0x{:04X} ({}) len={} version={} from={}{}",
                message.id, name, message.data_len, message.format_version, source, rtt
            );
        }
        OutputFormat::Raw => {
            print_raw(&message.to_bytes());
        }
    }
}

#[derive(Serialize)]
struct PingOutput {
    seq: u32,
    target: String,
    rtt_us: u128,
}

/// Print one ping result.
pub fn print_ping(seq: u32, target: SocketAddr, rtt: Duration, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PingOutput {
            seq,
            target: target.to_string(),
            rtt_us: rtt.as_micros(),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "TARGET", "RTT"])
                .add_row(vec![seq.to_string(), target.to_string(), format!("{rtt:?}")]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("PING_INTERFACE_RSP from {target}: seq={seq} time={rtt:?}");
        }
        OutputFormat::Raw => {
            println!("{}", rtt.as_micros());
        }
    }
}

#[derive(Serialize)]
struct CatalogRow {
    id: u16,
    id_hex: String,
    name: &'static str,
    kind: &'static str,
    handled: bool,
}

fn catalog_rows() -> Vec<CatalogRow> {
    let mut ids: Vec<MessageId> = Command::ALL
        .iter()
        .flat_map(|&c| [MessageId::Request(c), MessageId::Response(c)])
        .collect();
    ids.push(MessageId::ShutdownInterface);
    ids.sort_by_key(|id| id.raw());

    ids.into_iter()
        .map(|id| {
            let (kind, handled) = match id {
                MessageId::Request(
                    Command::PingInterface | Command::RequestInterfaceControl,
                ) => ("request", true),
                MessageId::Request(_) => ("request", false),
                MessageId::Response(_) => ("response", false),
                MessageId::ShutdownInterface => ("control", true),
            };
            CatalogRow {
                id: id.raw(),
                id_hex: format!("0x{:04X}", id.raw()),
                name: id.name(),
                kind,
                handled,
            }
        })
        .collect()
}

/// Print every catalogued message id.
pub fn print_catalog(format: OutputFormat) {
    let rows = catalog_rows();
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "KIND", "HANDLED"]);
            for row in &rows {
                table.add_row(vec![
                    row.id_hex.clone(),
                    row.name.to_string(),
                    row.kind.to_string(),
                    if row.handled { "yes" } else { "no" }.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in &rows {
                println!("{}  {}", row.id_hex, row.name);
            }
        }
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    log: &'static str,
    timestamp: String,
    timestamp_ns: u64,
    module_id: u16,
    module: &'static str,
    text: &'a str,
    level: u8,
}

impl<'a> EntryOutput<'a> {
    fn new(kind: LogKind, entry: &'a LogEntry) -> Self {
        Self {
            log: kind.name(),
            timestamp: format_timestamp(entry.timestamp_ns),
            timestamp_ns: entry.timestamp_ns,
            module_id: entry.module.id(),
            module: entry.module.name(),
            text: &entry.text,
            level: entry.level.as_u8(),
        }
    }
}

#[derive(Serialize)]
struct LogsOutput<'a> {
    events: Vec<EntryOutput<'a>>,
    errors: Vec<EntryOutput<'a>>,
}

/// Print the audit logs, either one after the other or merged by timestamp.
pub fn print_logs(audit: &AuditLog, merged: bool, format: OutputFormat) {
    let records: Vec<(LogKind, LogEntry)> = if merged {
        audit.merged()
    } else {
        audit
            .events()
            .entries()
            .into_iter()
            .map(|e| (LogKind::Event, e))
            .chain(
                audit
                    .errors()
                    .entries()
                    .into_iter()
                    .map(|e| (LogKind::Error, e)),
            )
            .collect()
    };

    match format {
        OutputFormat::Json => {
            if merged {
                let entries: Vec<EntryOutput<'_>> = records
                    .iter()
                    .map(|(kind, entry)| EntryOutput::new(*kind, entry))
                    .collect();
                print_json(&entries);
            } else {
                let (events, errors): (Vec<_>, Vec<_>) = records
                    .iter()
                    .map(|(kind, entry)| EntryOutput::new(*kind, entry))
                    .partition(|out| out.log == LogKind::Event.name());
                print_json(&LogsOutput { events, errors });
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LOG", "TIMESTAMP", "MODULE", "TEXT", "LEVEL"]);
            for (kind, entry) in &records {
                table.add_row(vec![
                    kind.name().to_string(),
                    format_timestamp(entry.timestamp_ns),
                    entry.module.name().to_string(),
                    entry.text.clone(),
                    entry.level.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            let mut out = std::io::stdout().lock();
            let _ = if merged {
                audit.print_merged(&mut out)
            } else {
                audit.print_all(&mut out)
            };
            let _ = out.flush();
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
