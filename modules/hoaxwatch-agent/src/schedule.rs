//! Daily run scheduling. Pure time arithmetic is separated from the sleep
//! loop so tests never need a real clock.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use tokio::sync::watch;
use tracing::{error, info};

use hoaxwatch_common::HoaxWatchError;

use crate::monitor::Monitor;

/// The schedule's wall clock: UTC+7 (Asia/Jakarta, no DST).
const SCHEDULE_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Longest single sleep between shutdown-flag checks.
const SLEEP_INCREMENT: Duration = Duration::from_secs(60);

/// Daily run time in the schedule's local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub hour: u32,
    pub minute: u32,
}

impl std::str::FromStr for DailySchedule {
    type Err = HoaxWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HoaxWatchError::Config(format!("Schedule time must be HH:MM, got {s:?}"));
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

/// Time until the next occurrence of the scheduled wall-clock time:
/// today's slot if it is still ahead, otherwise tomorrow's.
pub fn next_run_delay(now: DateTime<Utc>, schedule: DailySchedule) -> Duration {
    let offset = FixedOffset::east_opt(SCHEDULE_UTC_OFFSET_SECS).expect("valid fixed offset");
    let local = now.with_timezone(&offset).naive_local();
    let target_time =
        NaiveTime::from_hms_opt(schedule.hour, schedule.minute, 0).expect("validated schedule");

    let mut target = local.date().and_time(target_time);
    if target <= local {
        target += chrono::Duration::days(1);
    }

    Duration::from_secs((target - local).num_seconds().max(0) as u64)
}

/// Run once immediately, then once per day at the scheduled time, until the
/// shutdown flag flips. Runs never overlap: the loop awaits each run before
/// sleeping toward the next.
pub async fn run_daily(monitor: &Monitor, schedule: DailySchedule, shutdown: watch::Receiver<bool>) {
    info!(
        hour = schedule.hour,
        minute = schedule.minute,
        "Scheduler started, running first job immediately"
    );
    run_once(monitor).await;

    loop {
        let delay = next_run_delay(Utc::now(), schedule);
        info!(next_run_secs = delay.as_secs(), "Sleeping until next scheduled run");
        if !sleep_interruptible(delay, &shutdown).await {
            info!("Shutdown requested, stopping scheduler");
            return;
        }
        run_once(monitor).await;
    }
}

async fn run_once(monitor: &Monitor) {
    match monitor.run_job().await {
        Ok(stats) => info!("Run complete. {stats}"),
        // A failed run (e.g. storage rollback) waits for the next slot; no
        // pipeline error is fatal to the process.
        Err(e) => error!(error = %e, "Run failed, waiting for next scheduled slot"),
    }
}

/// Sleep `total`, waking at most every `SLEEP_INCREMENT` to check the
/// shutdown flag. Returns false if shutdown was requested.
async fn sleep_interruptible(total: Duration, shutdown: &watch::Receiver<bool>) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if *shutdown.borrow() {
            return false;
        }
        let step = remaining.min(SLEEP_INCREMENT);
        tokio::time::sleep(step).await;
        remaining = remaining.saturating_sub(step);
    }
    !*shutdown.borrow()
}
