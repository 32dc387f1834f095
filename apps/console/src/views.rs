use client_core::{CollectionEvent, Resource, ViewSynchronizer};
use shared::{
    domain::{Appointment, Lead, Patient},
    protocol::{CalendarEvent, DashboardSummary},
};
use tokio::task::JoinHandle;

/// Rendering side of the synchronizer contract: subscribes to change
/// events and narrates them. `InFlightChanged` is where a real form would
/// disable and re-enable its submit control.
pub fn watch<R: Resource>(synchronizer: &ViewSynchronizer<R>, label: &'static str) -> JoinHandle<()> {
    let mut rx = synchronizer.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                CollectionEvent::Refreshed { records } => {
                    println!("[{label}] {} registros cargados", records.len());
                }
                CollectionEvent::Created { record } => {
                    println!("[{label}] creado #{}", record.id());
                }
                CollectionEvent::Replaced { record } => {
                    println!("[{label}] actualizado #{}", record.id());
                }
                CollectionEvent::Removed { id } => {
                    println!("[{label}] eliminado #{id}");
                }
                CollectionEvent::InFlightChanged { operation, active } => {
                    if active {
                        println!("[{label}] {operation} en curso; controles deshabilitados");
                    } else {
                        println!("[{label}] {operation} terminado; controles habilitados");
                    }
                }
            }
        }
    })
}

pub fn print_appointments(records: &[Appointment]) {
    for appointment in records {
        println!(
            "#{}  {}  paciente {}  {}  {}  {} min{}",
            appointment.id,
            appointment.date.format("%Y-%m-%d %H:%M"),
            appointment.patient_id,
            appointment.service_type,
            appointment.status,
            appointment.duration,
            appointment
                .notes
                .as_deref()
                .map(|notes| format!("  ({notes})"))
                .unwrap_or_default(),
        );
    }
}

pub fn print_leads(records: &[Lead]) {
    for lead in records {
        println!(
            "#{}  {}  {}  {}  {}",
            lead.id,
            lead.name,
            lead.status,
            lead.phone.as_deref().unwrap_or("-"),
            lead.email.as_deref().unwrap_or("-"),
        );
    }
}

pub fn print_patients(records: &[Patient]) {
    for patient in records {
        println!(
            "#{}  {}  {}  {}",
            patient.id,
            patient.name,
            patient.phone.as_deref().unwrap_or("-"),
            patient.email.as_deref().unwrap_or("-"),
        );
    }
}

pub fn print_calendar(events: &[CalendarEvent]) {
    for event in events {
        println!(
            "{} - {}  {}  ({})",
            event.start.format("%Y-%m-%d %H:%M"),
            event.end.format("%H:%M"),
            event.title,
            event.extended_props.service_type,
        );
    }
}

pub fn print_summary(summary: &DashboardSummary) {
    println!("Citas de hoy:       {}", summary.appointments_today);
    println!("Citas programadas:  {}", summary.scheduled_appointments);
    println!("Pacientes:          {}", summary.total_patients);
    println!("Leads abiertos:     {}", summary.open_leads);
    println!("Leads convertidos:  {}", summary.converted_leads);
}
