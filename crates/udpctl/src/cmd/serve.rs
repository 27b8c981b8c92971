use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;
use udpctl_log::{LogConfig, TimestampMode};
use udpctl_server::{ControlServer, ReplyTarget, ServerConfig, ThreadMode};
use udpctl_transport::TransportConfig;

use crate::cmd::{parse_duration, ReplyMode, ServeArgs, TimestampArg};
use crate::exit::{server_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_logs, OutputFormat};

const MONITOR_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let max_runtime = args.max_runtime.as_deref().map(parse_duration).transpose()?;
    let config = server_config(&args);

    let mut server =
        ControlServer::new(config).map_err(|err| server_error("invalid configuration", err))?;

    let interrupted = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(interrupted.clone())?;

    let local = server
        .start()
        .map_err(|err| server_error("start failed", err))?;
    info!(%local, "serving control interface");

    let started = Instant::now();
    while server.is_receiving() {
        if interrupted.load(Ordering::SeqCst) {
            info!("interrupted, stopping");
            server.request_shutdown();
            break;
        }
        if max_runtime.is_some_and(|limit| started.elapsed() >= limit) {
            info!("max runtime reached, stopping");
            server.request_shutdown();
            break;
        }
        thread::sleep(MONITOR_INTERVAL);
    }

    let stopped = server.stop();
    print_logs(server.audit(), args.merged, format);
    stopped.map_err(|err| server_error("stop failed", err))?;

    Ok(SUCCESS)
}

fn server_config(args: &ServeArgs) -> ServerConfig {
    let reply_target = match args.reply {
        ReplyMode::Fixed => ReplyTarget::FixedPort(args.reply_port),
        ReplyMode::Source => ReplyTarget::SourcePort,
    };
    let timestamp_mode = match args.timestamps {
        TimestampArg::SinceStart => TimestampMode::SinceStart,
        TimestampArg::Epoch => TimestampMode::Epoch,
    };

    ServerConfig::default()
        .with_transport(
            TransportConfig::default()
                .with_bind_addr(args.bind)
                .with_port(args.port),
        )
        .with_log(
            LogConfig::default()
                .with_event_capacity(args.event_capacity)
                .with_error_capacity(args.error_capacity)
                .with_timestamp_mode(timestamp_mode),
        )
        .with_reply_target(reply_target)
        .with_thread_mode(ThreadMode::Background)
}

fn install_ctrlc_handler(interrupted: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
