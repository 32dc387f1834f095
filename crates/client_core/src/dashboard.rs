use chrono::NaiveDate;
use shared::{
    domain::{Appointment, AppointmentStatus, Lead, LeadStatus, Patient},
    protocol::DashboardSummary,
};

/// Headline numbers for the dashboard view, derived from the mirrored
/// collections. `today` is the viewer's current date.
pub fn summarize(
    appointments: &[Appointment],
    leads: &[Lead],
    patients: &[Patient],
    today: NaiveDate,
) -> DashboardSummary {
    let appointments_today = appointments
        .iter()
        .filter(|appointment| appointment.date.date_naive() == today)
        .count();
    let scheduled_appointments = appointments
        .iter()
        .filter(|appointment| appointment.status == AppointmentStatus::Scheduled)
        .count();
    let open_leads = leads
        .iter()
        .filter(|lead| {
            matches!(
                lead.status,
                LeadStatus::Nuevo | LeadStatus::Contactado | LeadStatus::Interesado
            )
        })
        .count();
    let converted_leads = leads
        .iter()
        .filter(|lead| lead.status == LeadStatus::Convertido)
        .count();

    DashboardSummary {
        appointments_today,
        scheduled_appointments,
        total_patients: patients.len(),
        open_leads,
        converted_leads,
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
