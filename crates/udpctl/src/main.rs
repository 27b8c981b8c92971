mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "udpctl", version, about = "UDP control-plane listener")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::ReplyMode;

    #[test]
    fn parses_serve_defaults() {
        let cli = Cli::try_parse_from(["udpctl", "serve"]).expect("serve args should parse");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 49153);
        assert_eq!(args.reply, ReplyMode::Fixed);
        assert_eq!(args.event_capacity, 200);
        assert_eq!(args.error_capacity, 100);
        assert!(args.max_runtime.is_none());
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "udpctl",
            "serve",
            "--bind",
            "127.0.0.1",
            "--port",
            "0",
            "--reply",
            "source",
            "--max-runtime",
            "2s",
            "--merged",
        ])
        .expect("serve overrides should parse");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 0);
        assert_eq!(args.reply, ReplyMode::Source);
        assert!(args.merged);
    }

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "udpctl",
            "send",
            "127.0.0.1:49153",
            "PING_INTERFACE",
            "--wait",
            "--wait-timeout",
            "500ms",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn send_accepts_raw_hex_without_message() {
        let cli = Cli::try_parse_from(["udpctl", "send", "127.0.0.1", "--raw-hex", "0102"])
            .expect("raw send should parse");
        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert!(args.message.is_none());
        assert_eq!(args.raw_hex.as_deref(), Some("0102"));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "udpctl",
            "send",
            "127.0.0.1",
            "PING_INTERFACE",
            "--raw-hex",
            "0102",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn send_requires_message_or_raw() {
        let err = Cli::try_parse_from(["udpctl", "send", "127.0.0.1"])
            .expect_err("missing message should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn format_is_global() {
        let cli = Cli::try_parse_from(["udpctl", "catalog", "--format", "json"])
            .expect("global format should parse after subcommand");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
