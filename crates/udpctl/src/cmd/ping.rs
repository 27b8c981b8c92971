use udpctl_server::{ClientConfig, ControlClient};

use crate::cmd::{parse_duration, parse_target, PingArgs};
use crate::exit::{server_error, CliResult, SUCCESS};
use crate::output::{print_ping, OutputFormat};

pub fn run(args: PingArgs, format: OutputFormat) -> CliResult<i32> {
    let target = parse_target(&args.target)?;
    let timeout = parse_duration(&args.timeout)?;
    let config = ClientConfig::default()
        .with_local_port(args.local_port)
        .with_timeout(timeout);
    let client = ControlClient::with_config(target, config)
        .map_err(|err| server_error("bind failed", err))?;

    for seq in 1..=args.count.max(1) {
        let rtt = client
            .ping()
            .map_err(|err| server_error("ping failed", err))?;
        print_ping(seq, target, rtt, format);
    }

    Ok(SUCCESS)
}
