use std::time::Instant;

use tracing::debug;
use udpctl_frame::ControlMessage;
use udpctl_server::{ClientConfig, ControlClient};

use crate::cmd::{parse_duration, parse_hex, parse_message_id, parse_target, SendArgs};
use crate::exit::{server_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let target = parse_target(&args.target)?;
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let config = ClientConfig::default()
        .with_local_port(args.local_port)
        .with_timeout(wait_timeout);
    let client = ControlClient::with_config(target, config)
        .map_err(|err| server_error("bind failed", err))?;

    let started = Instant::now();
    match (&args.raw_hex, &args.message) {
        (Some(hex), _) => {
            let bytes = parse_hex(hex)?;
            debug!(len = bytes.len(), %target, "sending raw datagram");
            client
                .send_raw(&bytes)
                .map_err(|err| server_error("send failed", err))?;
        }
        (None, Some(message)) => {
            let id = parse_message_id(message)?;
            debug!(id, %target, "sending control frame");
            client
                .send(&ControlMessage::new(id))
                .map_err(|err| server_error("send failed", err))?;
        }
        (None, None) => return Err(CliError::new(USAGE, "a message or --raw-hex is required")),
    }

    if args.wait {
        let (reply, source) = client
            .recv_from_within(wait_timeout)
            .map_err(|err| server_error("receive failed", err))?;
        print_message(&reply, source, Some(started.elapsed()), format);
    }

    Ok(SUCCESS)
}
