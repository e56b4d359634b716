//! Throughput metrics bucketed by day and week.
//!
//! Boundaries are computed in the time zone of the reference time `now`:
//! the day starts at local midnight and the week starts at local midnight of
//! the most recent Sunday (`Weekday::num_days_from_sunday() == 0`). Both
//! boundaries are inclusive.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AgentRuntime, CostSnapshot, Item, ItemStatus};

/// Aggregated throughput for one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityMetrics {
    /// Items still open or in progress
    pub open_count: usize,
    pub created_today: usize,
    pub created_week: usize,
    pub closed_today: usize,
    pub closed_week: usize,
    pub total_agents: usize,
    /// Agents in the `working` or `spawning` state
    pub working_agents: usize,
    pub total_cost_usd: f64,
    pub today_cost_usd: f64,
    pub session_count: u64,
}

/// Start of the day and week containing `now`, as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    pub today_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
}

/// Local midnight of `date` in `tz`.
///
/// When midnight falls in a DST gap the first valid hour after it is used.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compute the day and week boundaries for `now`.
pub fn boundaries<Tz: TimeZone>(now: &DateTime<Tz>) -> Boundaries {
    let tz = now.timezone();
    let today = now.date_naive();
    let fallback = now.with_timezone(&Utc);

    let today_start = local_midnight(&tz, today).unwrap_or(fallback);
    let offset = u64::from(today.weekday().num_days_from_sunday());
    let week_start = today
        .checked_sub_days(Days::new(offset))
        .and_then(|date| local_midnight(&tz, date))
        .unwrap_or(today_start);

    Boundaries {
        today_start,
        week_start,
    }
}

/// Aggregate item, agent and cost snapshots relative to `now`.
///
/// Agent and cost inputs are optional and contribute zeros when absent.
pub fn compute_velocity<Tz: TimeZone>(
    items: &[Item],
    agents: Option<&[AgentRuntime]>,
    costs: Option<&CostSnapshot>,
    now: &DateTime<Tz>,
) -> VelocityMetrics {
    let Boundaries {
        today_start,
        week_start,
    } = boundaries(now);
    let mut metrics = VelocityMetrics::default();

    for item in items {
        if item.status.is_active() {
            metrics.open_count += 1;
        }
        if item.created_at >= today_start {
            metrics.created_today += 1;
        }
        if item.created_at >= week_start {
            metrics.created_week += 1;
        }
        if item.status == ItemStatus::Closed {
            if let Some(closed_at) = item.closed_at {
                if closed_at >= today_start {
                    metrics.closed_today += 1;
                }
                if closed_at >= week_start {
                    metrics.closed_week += 1;
                }
            }
        }
    }

    if let Some(agents) = agents {
        metrics.total_agents = agents.len();
        metrics.working_agents = agents.iter().filter(|a| a.is_working()).count();
    }

    if let Some(costs) = costs {
        metrics.total_cost_usd = costs.total_usd;
        metrics.today_cost_usd = costs.today_usd;
        metrics.session_count = costs.session_count;
    }

    tracing::debug!(
        open = metrics.open_count,
        created_today = metrics.created_today,
        closed_today = metrics.closed_today,
        "computed velocity"
    );

    metrics
}

/// A zone that moves from UTC-05:00 to UTC-04:00 on 2026-03-08 at
/// `SHIFT_HOUR`:00 UTC. With `SHIFT_HOUR = 7` this is US Eastern's spring
/// change; with `SHIFT_HOUR = 5` local midnight itself is skipped.
#[cfg(test)]
pub(crate) mod test_zone {
    use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpringForward<const SHIFT_HOUR: u32>;

    impl<const SHIFT_HOUR: u32> SpringForward<SHIFT_HOUR> {
        fn shift() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2026, 3, 8)
                .and_then(|d| d.and_hms_opt(SHIFT_HOUR, 0, 0))
                .unwrap()
        }

        fn before() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }
    }

    impl<const SHIFT_HOUR: u32> TimeZone for SpringForward<SHIFT_HOUR> {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Self
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let candidates: Vec<FixedOffset> = [Self::before(), Self::after()]
                .into_iter()
                .filter(|offset| {
                    let utc = *local - *offset;
                    (*offset == Self::before()) == (utc < Self::shift())
                })
                .collect();
            match candidates.as_slice() {
                [single] => LocalResult::Single(*single),
                [early, late] => LocalResult::Ambiguous(*early, *late),
                _ => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::shift() { Self::before() } else { Self::after() }
        }
    }
}
