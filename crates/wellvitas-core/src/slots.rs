//! Taster slot availability
//!
//! Future dates offer the whole base schedule. On the current day only
//! slots starting strictly after `now + lead` remain bookable.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::types::{parse_slot, Taster};

/// Default lead time before a same-day slot
pub const DEFAULT_LEAD_MINUTES: i64 = 15;

/// Compute the bookable slots for `date`.
///
/// `date` is the raw `YYYY-MM-DD` field; an empty or unparseable value means
/// no constraint yet, so the full base schedule is returned. Order follows
/// `base`.
pub fn available_slots(date: &str, base: &[&str], now: NaiveDateTime, lead: Duration) -> Vec<String> {
    let all = || base.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    if date.is_empty() {
        return all();
    }
    let Ok(selected) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        return all();
    };
    if !is_same_day(selected, now) {
        return all();
    }

    // A cutoff past the end of time leaves nothing bookable today
    let Some(cutoff) = now.checked_add_signed(lead) else {
        return Vec::new();
    };
    base.iter()
        .filter(|hhmm| {
            parse_slot(hhmm)
                .map(|time| selected.and_time(time) > cutoff)
                .unwrap_or(false)
        })
        .map(|s| s.to_string())
        .collect()
}

/// Calendar-day comparison on year/month/day components
fn is_same_day(date: NaiveDate, now: NaiveDateTime) -> bool {
    date.year() == now.year() && date.month() == now.month() && date.day() == now.day()
}

/// Keep the taster time consistent with the slots available right now.
///
/// With a date chosen, an empty or no-longer-offered time is replaced by the
/// first available slot, or cleared when nothing remains. Returns `true` when
/// the time changed.
pub fn reconcile_time(taster: &mut Taster, base: &[&str], now: NaiveDateTime, lead: Duration) -> bool {
    if taster.date.is_empty() {
        return false;
    }

    let slots = available_slots(&taster.date, base, now, lead);
    if !taster.time.is_empty() && slots.iter().any(|s| *s == taster.time) {
        return false;
    }

    let replacement = slots.into_iter().next().unwrap_or_default();
    if replacement == taster.time {
        return false;
    }
    tracing::debug!(
        date = %taster.date,
        from = %taster.time,
        to = %replacement,
        "reselected taster time"
    );
    taster.time = replacement;
    true
}
