use super::*;
use chrono::TimeZone;
use shared::domain::{
    Appointment, AppointmentId, AppointmentStatus, PatientId, ServiceType, UserId,
};

fn appointment(id: i64, patient: i64, date: &str, duration: u32) -> Appointment {
    Appointment {
        id: AppointmentId(id),
        patient_id: PatientId(patient),
        date: date.parse().expect("timestamp"),
        service_type: ServiceType::Consulta,
        status: AppointmentStatus::Scheduled,
        notes: None,
        duration,
        created_at: None,
        updated_at: None,
    }
}

fn patient(id: i64, name: &str) -> Patient {
    Patient {
        id: PatientId(id),
        name: name.to_string(),
        email: None,
        phone: None,
        address: None,
        created_by: UserId(1),
        created_at: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        updated_at: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
    }
}

#[test]
fn event_spans_date_plus_duration_and_carries_the_patient_name() {
    let directory = patient_directory(&[patient(9, "Ana Torres")]);
    let event = event_for(&appointment(42, 9, "2024-05-10T15:30:00Z", 45), &directory);

    assert_eq!(event.id, "42");
    assert_eq!(event.title, "Ana Torres");
    assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap());
    assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 5, 10, 16, 15, 0).unwrap());
    assert_eq!(event.extended_props.duration, 45);
    assert_eq!(event.extended_props.status, AppointmentStatus::Scheduled);
}

#[test]
fn unknown_patient_gets_a_placeholder_title() {
    let directory = patient_directory(&[]);
    let event = event_for(&appointment(1, 77, "2024-05-10T15:30:00Z", 30), &directory);
    assert_eq!(event.title, "Paciente #77");
}

#[test]
fn day_window_keeps_only_overlapping_events_in_start_order() {
    let directory = patient_directory(&[patient(1, "Ana")]);
    let appointments = vec![
        appointment(1, 1, "2024-05-09T10:00:00Z", 30),
        appointment(2, 1, "2024-05-10T16:00:00Z", 30),
        appointment(3, 1, "2024-05-10T09:00:00Z", 30),
        appointment(4, 1, "2024-05-11T00:00:00Z", 30),
    ];

    let window = DateWindow::day("2024-05-10".parse().expect("date"));
    let events = events_in_window(&appointments, &directory, window);

    let ids: Vec<&str> = events.iter().map(|event| event.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2"]);
}

#[test]
fn event_crossing_midnight_shows_up_in_both_days() {
    let directory = patient_directory(&[patient(1, "Ana")]);
    // 23:45 + 30min ends at 00:15 the next day.
    let appointments = vec![appointment(1, 1, "2024-05-10T23:45:00Z", 30)];

    let first_day = DateWindow::day("2024-05-10".parse().expect("date"));
    let second_day = DateWindow::day("2024-05-11".parse().expect("date"));

    assert_eq!(events_in_window(&appointments, &directory, first_day).len(), 1);
    assert_eq!(events_in_window(&appointments, &directory, second_day).len(), 1);
}

#[test]
fn window_bounds_are_half_open() {
    let window = DateWindow::new(
        Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap(),
    );

    // Ends exactly at `from`: out. Starts exactly at `to`: out.
    assert!(!window.overlaps(
        Utc.with_ymd_and_hms(2024, 5, 9, 23, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
    ));
    assert!(!window.overlaps(
        Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 11, 0, 30, 0).unwrap(),
    ));
    assert!(window.overlaps(
        Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 10, 0, 30, 0).unwrap(),
    ));
}

#[test]
fn spanning_window_covers_consecutive_days() {
    let directory = patient_directory(&[patient(1, "Ana")]);
    let appointments = vec![
        appointment(1, 1, "2024-05-10T09:00:00Z", 30),
        appointment(2, 1, "2024-05-12T09:00:00Z", 30),
        appointment(3, 1, "2024-05-14T09:00:00Z", 30),
    ];

    let window = DateWindow::spanning_days("2024-05-10".parse().expect("date"), 3);
    let events = events_in_window(&appointments, &directory, window);
    assert_eq!(events.len(), 2);
}
