use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use udpctl_frame::{Command as ControlCommand, MessageId, SHUTDOWN_INTERFACE};
use udpctl_transport::CONTROL_PORT;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod catalog;
pub mod ping;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the control listener until SHUTDOWN_INTERFACE, Ctrl-C or --max-runtime.
    Serve(ServeArgs),
    /// Send a single control frame.
    Send(SendArgs),
    /// Send PING_INTERFACE and wait for the response.
    Ping(PingArgs),
    /// List catalogued message ids.
    Catalog(CatalogArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Ping(args) => ping::run(args, format),
        Command::Catalog(args) => catalog::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReplyMode {
    /// Reply to the sender's IP at the fixed reply port.
    Fixed,
    /// Reply to the sender's exact address.
    Source,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimestampArg {
    /// Time since the logs were created.
    SinceStart,
    /// Wall-clock time since the Unix epoch.
    Epoch,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// IPv4 address to bind.
    #[arg(long, default_value = "0.0.0.0", env = "UDPCTL_BIND")]
    pub bind: Ipv4Addr,
    /// UDP port to listen on.
    #[arg(long, default_value_t = CONTROL_PORT, env = "UDPCTL_PORT")]
    pub port: u16,
    /// Where responses are sent.
    #[arg(long, value_enum, default_value = "fixed")]
    pub reply: ReplyMode,
    /// Destination port for `--reply fixed`.
    #[arg(long, default_value_t = CONTROL_PORT)]
    pub reply_port: u16,
    /// Stop after this long (e.g. 30s, 500ms).
    #[arg(long)]
    pub max_runtime: Option<String>,
    /// Event log capacity in slots.
    #[arg(long, default_value_t = udpctl_log::DEFAULT_EVENT_CAPACITY)]
    pub event_capacity: usize,
    /// Error log capacity in slots.
    #[arg(long, default_value_t = udpctl_log::DEFAULT_ERROR_CAPACITY)]
    pub error_capacity: usize,
    /// Timestamp origin for log records.
    #[arg(long, value_enum, default_value = "since-start")]
    pub timestamps: TimestampArg,
    /// Print one log interleaved by timestamp instead of events then errors.
    #[arg(long)]
    pub merged: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Target address (host or host:port).
    pub target: String,
    /// Message name (PING_INTERFACE) or numeric id (1, 0x0001).
    #[arg(required_unless_present = "raw_hex")]
    pub message: Option<String>,
    /// Send exactly these hex bytes instead of a frame.
    #[arg(long, value_name = "HEX", conflicts_with = "message")]
    pub raw_hex: Option<String>,
    /// Local port to send from (0 = ephemeral).
    #[arg(long, default_value_t = 0)]
    pub local_port: u16,
    /// Wait for one valid frame and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Target address (host or host:port).
    pub target: String,
    /// Number of pings to send.
    #[arg(long, short = 'c', default_value_t = 1)]
    pub count: u32,
    /// Local port to send from (0 = ephemeral).
    #[arg(long, default_value_t = 0)]
    pub local_port: u16,
    /// Maximum time to wait for each response (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse durations like `5s`, `150ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

/// Resolve `host` or `host:port`, defaulting to the control port.
pub fn parse_target(input: &str) -> CliResult<SocketAddr> {
    let with_port = if input.parse::<SocketAddr>().is_ok() || input.contains(':') {
        input.to_string()
    } else {
        format!("{input}:{CONTROL_PORT}")
    };
    with_port
        .to_socket_addrs()
        .map_err(|err| CliError::new(USAGE, format!("invalid target {input:?}: {err}")))?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| CliError::new(USAGE, format!("no IPv4 address for target {input:?}")))
}

/// Resolve a message by catalog name or by decimal/hex id.
///
/// Numeric ids outside the catalog are accepted so unhandled ids can be sent.
pub fn parse_message_id(input: &str) -> CliResult<u16> {
    let input = input.trim();
    let upper = input.to_ascii_uppercase();

    if upper == "SHUTDOWN_INTERFACE" {
        return Ok(SHUTDOWN_INTERFACE);
    }
    for command in ControlCommand::ALL {
        for id in [MessageId::Request(command), MessageId::Response(command)] {
            if id.name() == upper {
                return Ok(id.raw());
            }
        }
    }

    let parsed = match upper.strip_prefix("0X") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => upper.parse(),
    };
    parsed.map_err(|_| CliError::new(USAGE, format!("unknown message {input:?}")))
}

/// Decode a hex string, ignoring whitespace.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() {
        return Err(CliError::new(USAGE, "hex input must be ASCII"));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "hex input must have an even number of digits"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex byte {:?}", &digits[i..i + 2])))
        })
        .collect()
}
