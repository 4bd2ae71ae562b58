//! Watch command implementation.
//!
//! Reads one device, prints a line, then sleeps until the device reports its
//! next measurement (never less than the minimum interval). A failed read is
//! reported and the next attempt follows after the minimum interval; there is
//! no backoff.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use aranet_bridge::{CommandRunner, DeviceRecord, Reader};
use owo_colors::OwoColorize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_watch_json, format_watch_line};
use crate::util::open_output;

/// Floor for the configured minimum interval, so the tool is never run in a
/// tight loop.
const MIN_WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    pub address: String,
    pub min_interval: Duration,
    pub count: u32,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_watch<R: CommandRunner>(reader: &Reader<R>, args: WatchArgs<'_>) -> Result<()> {
    if !args.quiet {
        let header = if args.opts.no_color {
            format!("Watching: {}", args.address)
        } else {
            format!("Watching: {}", args.address.cyan())
        };
        eprintln!("{}", header);
        if args.count > 0 {
            eprintln!(
                "Min interval: {}s | Count: {} | Press Ctrl+C to stop",
                args.min_interval.as_secs(),
                args.count
            );
        } else {
            eprintln!(
                "Min interval: {}s | Press Ctrl+C to stop",
                args.min_interval.as_secs()
            );
        }
        eprintln!("{}", "-".repeat(50));
    }

    let mut out = open_output(args.output)?;
    let taken = watch_loop(reader, &args, &mut out, tokio::signal::ctrl_c()).await?;

    if !args.quiet && args.count > 0 && taken >= args.count {
        eprintln!("Completed {} readings.", taken);
    }
    Ok(())
}

/// Wait before the next read: the device's next update, floored to `min`.
pub fn next_delay(record: Option<&DeviceRecord>, min: Duration) -> Duration {
    let min = min.max(MIN_WATCH_INTERVAL);
    record
        .and_then(DeviceRecord::next_update)
        .map_or(min, |wait| wait.max(min))
}

/// Run the watch loop until `count` readings are taken or `shutdown`
/// completes. Returns the number of successful readings.
async fn watch_loop<R, W, S>(
    reader: &Reader<R>,
    args: &WatchArgs<'_>,
    out: &mut W,
    shutdown: S,
) -> Result<u32>
where
    R: CommandRunner,
    W: Write + ?Sized,
    S: Future,
{
    tokio::pin!(shutdown);
    let mut taken: u32 = 0;

    loop {
        let result = tokio::select! {
            _ = &mut shutdown => break,
            result = reader.read(&args.address) => result,
        };

        let delay = match result {
            Ok(record) => {
                let now = OffsetDateTime::now_utc();
                let line = match args.format {
                    OutputFormat::Json => format_watch_json(&record, now)?,
                    OutputFormat::Text => format_watch_line(&record, now, args.opts),
                };
                out.write_all(line.as_bytes())?;
                out.flush()?;
                taken += 1;
                next_delay(Some(&record), args.min_interval)
            }
            Err(err) => {
                let delay = next_delay(None, args.min_interval);
                warn!(address = %args.address, "Read failed: {}", err);
                if !args.quiet {
                    eprintln!(
                        "Read failed: {}. Retrying in {}s...",
                        err.to_string().trim_end(),
                        delay.as_secs()
                    );
                }
                delay
            }
        };

        if args.count > 0 && taken >= args.count {
            break;
        }

        debug!(delay_ms = delay.as_millis() as u64, "Waiting for next reading");
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    if !args.quiet && (args.count == 0 || taken < args.count) {
        eprintln!("\nShutting down...");
    }
    Ok(taken)
}
