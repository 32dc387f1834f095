use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use shared::{
    domain::{Appointment, Patient, PatientId},
    protocol::{CalendarEvent, CalendarEventProps},
};

/// Half-open interval `[from, to)` shown by a calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// The single calendar day starting at UTC midnight.
    pub fn day(day: NaiveDate) -> Self {
        let from = day.and_time(NaiveTime::MIN).and_utc();
        Self {
            from,
            to: from + Duration::days(1),
        }
    }

    pub fn spanning_days(day: NaiveDate, days: u32) -> Self {
        let from = day.and_time(NaiveTime::MIN).and_utc();
        Self {
            from,
            to: from + Duration::days(i64::from(days)),
        }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.to && end > self.from
    }
}

/// Patient-id to display-name lookup for event titles.
pub fn patient_directory(patients: &[Patient]) -> HashMap<PatientId, String> {
    patients
        .iter()
        .map(|patient| (patient.id, patient.name.clone()))
        .collect()
}

/// Maps one appointment to its calendar entry: titled with the patient's
/// name, spanning `date .. date + duration`.
pub fn event_for(
    appointment: &Appointment,
    directory: &HashMap<PatientId, String>,
) -> CalendarEvent {
    let start = appointment.date;
    let end = start + Duration::minutes(i64::from(appointment.duration));
    let title = directory
        .get(&appointment.patient_id)
        .cloned()
        .unwrap_or_else(|| format!("Paciente #{}", appointment.patient_id));
    CalendarEvent {
        id: appointment.id.to_string(),
        title,
        start,
        end,
        extended_props: CalendarEventProps {
            patient_id: appointment.patient_id,
            service_type: appointment.service_type,
            duration: appointment.duration,
            notes: appointment.notes.clone(),
            status: appointment.status,
        },
    }
}

/// Event feed for a window, ordered by start time. An event is shown when
/// any part of it overlaps the window.
pub fn events_in_window(
    appointments: &[Appointment],
    directory: &HashMap<PatientId, String>,
    window: DateWindow,
) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = appointments
        .iter()
        .map(|appointment| event_for(appointment, directory))
        .filter(|event| window.overlaps(event.start, event.end))
        .collect();
    events.sort_by_key(|event| event.start);
    events
}

#[cfg(test)]
#[path = "tests/calendar_tests.rs"]
mod tests;
