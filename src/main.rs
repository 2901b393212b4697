use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use session_sentinel::{
    monitor::{
        args::SentinelArgs, build_monitor, ActivityHandle, ActivityKind, MonitorConfig,
        DEFAULT_LOGIN_REDIRECT,
    },
    session_api::http::HttpSessionApi,
    surface::TerminalSurface,
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, SENTINEL_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

fn main() -> Result<()> {
    let args = SentinelArgs::parse();
    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, Ok)?;
    enable_logging(SENTINEL_PREFIX, &app_dir, args.log, args.log_console)?;
    single_thread_runtime()?.block_on(run(args)).inspect_err(|e| {
        error!("Error running sentinel {e:?}");
    })
}

async fn run(args: SentinelArgs) -> Result<()> {
    let mut config = MonitorConfig::default();
    if let Some(secs) = args.timeout_secs {
        config.inactivity_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.poll_secs {
        config.poll_period = Duration::from_secs(secs);
    }
    let base_url = args.base_url.trim_end_matches('/');
    config.login_redirect = format!("{base_url}{DEFAULT_LOGIN_REDIRECT}");

    let api = Arc::new(HttpSessionApi::new(base_url, &args.csrf_token)?);

    let Some((handle, tracker)) = build_monitor(
        config,
        api,
        Arc::new(TerminalSurface),
        Arc::new(DefaultClock),
        !args.unauthenticated,
    ) else {
        return Ok(());
    };

    let (_, run_result) = tokio::join!(pump_terminal_activity(handle), tracker.run());
    run_result
}

/// Feeds terminal input to the tracker as activity. Ctrl-C tears the monitor
/// down the way a page unload would.
async fn pump_terminal_activity(handle: ActivityHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = handle.closed() => return,
            _ = tokio::signal::ctrl_c() => {
                handle.teardown();
                return;
            }
            line = lines.next_line() => match line {
                Ok(Some(_)) => handle.record(ActivityKind::KeyPress),
                _ => {
                    handle.teardown();
                    return;
                }
            },
        }
    }
}
