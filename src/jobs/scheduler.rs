use chrono::{DateTime, Utc};
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};

/// Fixed-period tick source for the check loop.
///
/// Missed ticks are delayed rather than bursted, so a slow cycle pushes the
/// next one back instead of queueing several back to back.
pub struct Scheduler {
    ticker: Interval,
    period: Duration,
    previous_tick: Option<DateTime<Utc>>,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker,
            period,
            previous_tick: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn tick(&mut self) -> DateTime<Utc> {
        self.ticker.tick().await;
        let now = Utc::now();

        if let Some(previous) = self.previous_tick {
            let elapsed_secs = now.signed_duration_since(previous).num_seconds().max(0);
            let threshold_secs = (self.period.as_secs() * 2) as i64;
            if threshold_secs > 0 && elapsed_secs > threshold_secs {
                log::warn!(
                    "check_loop_delayed elapsed_secs={} threshold_secs={}",
                    elapsed_secs,
                    threshold_secs
                );
            }
        }

        self.previous_tick = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{Duration, Instant};

    use super::Scheduler;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let mut scheduler = Scheduler::new(Duration::from_secs(2));
        assert_eq!(scheduler.period(), Duration::from_secs(2));

        let start = Instant::now();
        scheduler.tick().await;
        scheduler.tick().await;
        scheduler.tick().await;

        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }
}
