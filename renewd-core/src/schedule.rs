//! 5-field cron expressions and the scheduler's trigger decision.
//!
//! The scheduler polls coarsely (every few seconds) rather than sleeping
//! until the exact trigger instant, so the trigger decision must tolerate
//! waking up late: [`should_trigger`] fires for the current minute or for
//! a scheduled minute that was missed since the last completed pass,
//! while never firing twice within the same minute.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, TimeZone, Timelike};

use crate::error::ScheduleError;

/// A missed scheduled minute older than this is not caught up. Bounds the
/// catch-up scan and keeps a long outage from firing a stale slot.
const CATCHUP_WINDOW_MINUTES: i64 = 24 * 60;

/// A parsed 5-field cron expression (minute, hour, day-of-month, month,
/// day-of-week), matched at minute granularity.
///
/// Field grammar: `*`, numbers, `a-b` ranges, comma lists, and `/n` steps
/// on `*` or ranges. Standard cron day semantics apply: when both
/// day-of-month and day-of-week are restricted, either matching suffices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CronField {
    any: bool,
    values: BTreeSet<u32>,
}

impl CronField {
    fn any() -> Self {
        Self {
            any: true,
            values: BTreeSet::new(),
        }
    }

    /// Parse one field. `wrap_sunday` maps 7 to 0 in the day-of-week
    /// field, where both denote Sunday.
    fn parse(field: &str, min: u32, max: u32, wrap_sunday: bool) -> Result<Self, ScheduleError> {
        if field == "*" {
            return Ok(Self::any());
        }

        let invalid = |detail: &str| ScheduleError::Field {
            field: field.to_string(),
            detail: detail.to_string(),
        };
        let number = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| invalid(&format!("'{s}' is not a number")))
        };

        let mut values = BTreeSet::new();
        for part in field.split(',') {
            let (range_part, step) = match part.split_once('/') {
                Some((range, step)) => {
                    let step = number(step)?;
                    if step == 0 {
                        return Err(invalid("step must be > 0"));
                    }
                    (range, step)
                }
                None => (part, 1),
            };

            let (lo, hi) = if range_part == "*" {
                (min, max)
            } else if let Some((a, b)) = range_part.split_once('-') {
                (number(a)?, number(b)?)
            } else {
                let v = number(range_part)?;
                // "N/step" means N through the field maximum.
                if part.contains('/') { (v, max) } else { (v, v) }
            };

            if lo > hi {
                return Err(invalid(&format!("inverted range {lo}-{hi}")));
            }
            for value in [lo, hi] {
                if value < min || value > max {
                    return Err(ScheduleError::OutOfRange { value, min, max });
                }
            }

            let mut v = lo;
            while v <= hi {
                values.insert(if wrap_sunday && v == 7 { 0 } else { v });
                v += step;
            }
        }

        Ok(Self { any: false, values })
    }

    fn matches(&self, value: u32) -> bool {
        self.any || self.values.contains(&value)
    }
}

impl CronExpr {
    /// Parse a 5-field cron expression.
    pub fn parse(expr: &str) -> Result<Self, ScheduleError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ScheduleError::FieldCount(fields.len()));
        }
        Ok(Self {
            minute: CronField::parse(fields[0], 0, 59, false)?,
            hour: CronField::parse(fields[1], 0, 23, false)?,
            day_of_month: CronField::parse(fields[2], 1, 31, false)?,
            month: CronField::parse(fields[3], 1, 12, false)?,
            day_of_week: CronField::parse(fields[4], 0, 7, true)?,
        })
    }

    /// Whether the expression matches the minute containing `dt`.
    pub fn matches<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> bool {
        if !self.minute.matches(dt.minute())
            || !self.hour.matches(dt.hour())
            || !self.month.matches(dt.month())
        {
            return false;
        }
        self.day_matches(dt.day(), dt.weekday().num_days_from_sunday())
    }

    // Vixie cron: if both day fields are restricted, either may match.
    fn day_matches(&self, day_of_month: u32, day_of_week: u32) -> bool {
        match (self.day_of_month.any, self.day_of_week.any) {
            (true, true) => true,
            (false, false) => {
                self.day_of_month.matches(day_of_month) || self.day_of_week.matches(day_of_week)
            }
            (false, true) => self.day_of_month.matches(day_of_month),
            (true, false) => self.day_of_week.matches(day_of_week),
        }
    }
}

/// The scheduler's per-tick trigger decision.
///
/// Fires when `now`'s minute matches the expression, or when a scheduled
/// minute between `last_trigger` and `now` was missed (limited to the
/// catch-up window). Never fires twice within the minute of the last
/// completed pass. A gap spanning several scheduled minutes yields a
/// single trigger, not one per missed slot.
///
/// With no previous pass there is nothing to catch up, so only an exact
/// match fires.
pub fn should_trigger<Tz: TimeZone>(
    expr: &CronExpr,
    last_trigger: Option<&DateTime<Tz>>,
    now: &DateTime<Tz>,
) -> bool {
    let now_minute = now.timestamp().div_euclid(60);
    if let Some(last) = last_trigger {
        if last.timestamp().div_euclid(60) == now_minute {
            return false;
        }
    }

    if expr.matches(now) {
        return true;
    }

    let Some(last) = last_trigger else {
        return false;
    };
    let last_minute = last.timestamp().div_euclid(60);
    let scan_from = (now_minute - CATCHUP_WINDOW_MINUTES).max(last_minute + 1);
    for minute in scan_from..now_minute {
        if let Some(dt) = now.timezone().timestamp_opt(minute * 60, 0).single() {
            if expr.matches(&dt) {
                return true;
            }
        }
    }
    false
}
