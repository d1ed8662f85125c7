//! Google Calendar implementation of the free/busy seam.

use crate::workflows::recruit::gateways::GatewaySetupError;
use crate::workflows::recruit::scheduling::{BusyInterval, CalendarError, CalendarGateway};
use chrono::{DateTime, NaiveDateTime, Utc};
use google_calendar3::api::{FreeBusyRequest, FreeBusyRequestItem, TimePeriod};
use google_calendar3::CalendarHub;
use tokio::runtime::Runtime;

pub struct GoogleCalendarClient<C>
where
    C: google_calendar3::common::Connector + Send + Sync + 'static,
{
    hub: CalendarHub<C>,
    runtime: Runtime,
}

impl<C> GoogleCalendarClient<C>
where
    C: google_calendar3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: CalendarHub<C>, runtime: Runtime) -> Self {
        Self { hub, runtime }
    }

    pub fn with_runtime(hub: CalendarHub<C>) -> Result<Self, GatewaySetupError> {
        let runtime = Runtime::new().map_err(|err| GatewaySetupError::Runtime(err.to_string()))?;
        Ok(Self::new(hub, runtime))
    }
}

impl<C> std::fmt::Debug for GoogleCalendarClient<C>
where
    C: google_calendar3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCalendarClient").finish_non_exhaustive()
    }
}

impl<C> CalendarGateway for GoogleCalendarClient<C>
where
    C: google_calendar3::common::Connector + Send + Sync + 'static,
{
    fn busy_intervals(
        &self,
        attendee: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<BusyInterval>, CalendarError> {
        let request = FreeBusyRequest {
            time_min: Some(DateTime::<Utc>::from_naive_utc_and_offset(from, Utc)),
            time_max: Some(DateTime::<Utc>::from_naive_utc_and_offset(to, Utc)),
            items: Some(vec![FreeBusyRequestItem {
                id: Some(attendee.to_string()),
            }]),
            ..FreeBusyRequest::default()
        };

        let result = self
            .runtime
            .block_on(async { self.hub.freebusy().query(request).doit().await });

        let (_, response) = result.map_err(|err| CalendarError::Backend(err.to_string()))?;
        let calendars = response.calendars.unwrap_or_default();
        let calendar = calendars
            .get(attendee)
            .ok_or_else(|| CalendarError::NoAccess(attendee.to_string()))?;

        Ok(busy_from_periods(calendar.busy.clone().unwrap_or_default()))
    }
}

fn busy_from_periods(periods: Vec<TimePeriod>) -> Vec<BusyInterval> {
    let mut busy: Vec<BusyInterval> = periods
        .into_iter()
        .filter_map(|period| Some((period.start?.naive_utc(), period.end?.naive_utc())))
        .collect();
    busy.sort_by_key(|&(start, _)| start);
    busy
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn period(start_hour: u32, end_hour: u32) -> TimePeriod {
        TimePeriod {
            start: Some(Utc.with_ymd_and_hms(2025, 3, 10, start_hour, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2025, 3, 10, end_hour, 0, 0).unwrap()),
        }
    }

    #[test]
    fn periods_are_sorted_and_incomplete_ones_dropped() {
        let busy = busy_from_periods(vec![
            period(14, 15),
            TimePeriod {
                start: None,
                end: Some(Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()),
            },
            period(9, 10),
        ]);

        assert_eq!(busy.len(), 2);
        assert!(busy[0].0 < busy[1].0);
    }
}
