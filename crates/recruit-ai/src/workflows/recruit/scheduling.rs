//! Free-slot computation over a recruiter's busy calendar.
//!
//! `collect_slots_in_window` is a pure sweep over sorted busy intervals; the
//! scanner above it walks business days across a bounded horizon until the
//! requested morning and afternoon slot counts are met.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tracing::warn;

/// Half-open busy interval `[start, end)`.
pub type BusyInterval = (NaiveDateTime, NaiveDateTime);

pub const SLOT_MINUTES: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("calendar backend unavailable: {0}")]
    Backend(String),
    #[error("no calendar access for {0}")]
    NoAccess(String),
}

/// Free/busy source for one attendee.
pub trait CalendarGateway: Send + Sync {
    /// Busy intervals for `attendee` within `[from, to)`.
    fn busy_intervals(
        &self,
        attendee: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<BusyInterval>, CalendarError>;
}

/// How far and how much the scanner looks for.
#[derive(Debug, Clone, Copy)]
pub struct SlotPlan {
    pub weeks_to_check: u32,
    pub morning_needed: usize,
    pub afternoon_needed: usize,
}

impl Default for SlotPlan {
    fn default() -> Self {
        Self {
            weeks_to_check: 2,
            morning_needed: 2,
            afternoon_needed: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPeriod {
    Morning,
    Afternoon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub period: SlotPeriod,
}

/// Slots found by one scan, grouped the way the applicant message lists them.
#[derive(Debug, Clone, Default)]
pub struct SlotSchedule {
    pub morning: Vec<InterviewSlot>,
    pub afternoon: Vec<InterviewSlot>,
}

impl SlotSchedule {
    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.afternoon.is_empty()
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len()
    }
}

/// Fill whole 30-minute slots in the gaps between sorted busy intervals,
/// sweeping a cursor from `window_start` toward `window_end`.
pub fn collect_slots_in_window(
    busy: &[BusyInterval],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    max_to_collect: usize,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let slot = Duration::minutes(SLOT_MINUTES);
    let mut slots = Vec::new();
    if max_to_collect == 0 {
        return slots;
    }

    let mut cursor = window_start;
    for &(start, end) in busy {
        // Busy blocks entirely behind the cursor are already accounted for.
        if end <= cursor {
            continue;
        }
        if start > cursor {
            let free_until = start.min(window_end);
            while slots.len() < max_to_collect && cursor + slot <= free_until {
                slots.push((cursor, cursor + slot));
                cursor += slot;
            }
            if slots.len() == max_to_collect {
                return slots;
            }
        }
        cursor = cursor.max(end);
        if cursor >= window_end {
            return slots;
        }
    }

    while slots.len() < max_to_collect && cursor + slot <= window_end {
        slots.push((cursor, cursor + slot));
        cursor += slot;
    }
    slots
}

/// Scan business days for open interview slots.
///
/// Starts the day after `today` (or the following Monday when `today` is a
/// Friday) and walks Monday–Friday across `plan.weeks_to_check` weeks, one
/// free/busy query per week. Mornings are 09:00–12:00, afternoons 13:00–17:00.
/// Weeks the calendar backend cannot serve are skipped, not fatal.
pub fn find_interview_slots<C>(
    calendar: &C,
    attendee: &str,
    today: NaiveDate,
    plan: SlotPlan,
) -> SlotSchedule
where
    C: CalendarGateway + ?Sized,
{
    let search_start = if today.weekday() == Weekday::Fri {
        today + Duration::days(3)
    } else {
        today + Duration::days(1)
    };
    let monday =
        search_start - Duration::days(search_start.weekday().num_days_from_monday() as i64);

    let mut schedule = SlotSchedule::default();

    for week in 0..plan.weeks_to_check {
        let week_start = monday + Duration::days(i64::from(week) * 7);
        let week_end = week_start + Duration::days(5);

        let mut busy = match calendar.busy_intervals(
            attendee,
            week_start.and_time(NaiveTime::MIN),
            week_end.and_time(NaiveTime::MIN),
        ) {
            Ok(busy) => busy,
            Err(err) => {
                warn!(attendee, week = week + 1, error = %err, "skipping week without calendar data");
                continue;
            }
        };
        busy.sort_by_key(|&(start, _)| start);

        for day_offset in 0..5 {
            if schedule.morning.len() >= plan.morning_needed
                && schedule.afternoon.len() >= plan.afternoon_needed
            {
                break;
            }
            let day = week_start + Duration::days(day_offset);
            if day < search_start {
                continue;
            }

            if schedule.morning.len() < plan.morning_needed {
                let found = collect_slots_in_window(
                    &busy,
                    at(day, 9),
                    at(day, 12),
                    plan.morning_needed - schedule.morning.len(),
                );
                schedule
                    .morning
                    .extend(found.into_iter().map(|(start, end)| InterviewSlot {
                        start,
                        end,
                        period: SlotPeriod::Morning,
                    }));
            }

            if schedule.afternoon.len() < plan.afternoon_needed {
                let found = collect_slots_in_window(
                    &busy,
                    at(day, 13),
                    at(day, 17),
                    plan.afternoon_needed - schedule.afternoon.len(),
                );
                schedule
                    .afternoon
                    .extend(found.into_iter().map(|(start, end)| InterviewSlot {
                        start,
                        end,
                        period: SlotPeriod::Afternoon,
                    }));
            }
        }

        if schedule.morning.len() >= plan.morning_needed
            && schedule.afternoon.len() >= plan.afternoon_needed
        {
            break;
        }
    }

    schedule
}

fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).expect("valid hour"))
}
