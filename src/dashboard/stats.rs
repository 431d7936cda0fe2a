//! Derived statistics
//!
//! Pure functions over the current ticket list. Nothing here is stored; the
//! dashboard recomputes both on every change.

use crate::tickets::{Ticket, TicketStatus};
use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::Serialize;

/// Number of days shown in the activity histogram
pub const HISTOGRAM_DAYS: usize = 7;

/// Ticket counts by status
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TicketStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    /// Closed tickets
    pub resolved: usize,
}

impl TicketStats {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        tickets.iter().fold(Self::default(), |mut stats, ticket| {
            match ticket.status {
                TicketStatus::Open => stats.open += 1,
                TicketStatus::InProgress => stats.in_progress += 1,
                TicketStatus::Closed => stats.resolved += 1,
            }
            stats.total += 1;
            stats
        })
    }

    /// Count for one status
    pub fn count(&self, status: TicketStatus) -> usize {
        match status {
            TicketStatus::Open => self.open,
            TicketStatus::InProgress => self.in_progress,
            TicketStatus::Closed => self.resolved,
        }
    }
}

impl std::fmt::Display for TicketStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total={}, open={}, in_progress={}, resolved={}",
            self.total, self.open, self.in_progress, self.resolved
        )
    }
}

/// One histogram bar
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayBucket {
    /// Short month and day, e.g. "Oct 18"
    pub label: String,
    pub date: NaiveDate,
    pub count: usize,
}

/// Tickets created on each of the `days` calendar days ending with the day of
/// `now`, oldest first. Days are `[00:00, next 00:00)` in `now`'s time zone.
pub fn daily_histogram<Tz: TimeZone>(tickets: &[Ticket], now: &DateTime<Tz>, days: usize) -> Vec<DayBucket> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..days as u64)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| {
            let start = day_start(&tz, date);
            let end = date
                .succ_opt()
                .map(|next| day_start(&tz, next))
                .unwrap_or(i64::MAX);
            let count = tickets
                .iter()
                .filter(|t| t.created_at >= start && t.created_at < end)
                .count();

            DayBucket {
                label: date.format("%b %-d").to_string(),
                date,
                count,
            }
        })
        .collect()
}

/// First instant of `date` in `tz`, in Unix milliseconds. When midnight is
/// skipped by a DST change the day starts at the first valid hour.
fn day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    (0..24)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.timestamp_millis())
        .or_else(|| date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc().timestamp_millis()))
        .unwrap_or_default()
}
