use std::sync::Arc;

use shared::domain::{Appointment, Lead, Patient};

pub mod calendar;
pub mod dashboard;
pub mod error;
pub mod resource;
pub mod session;
pub mod synchronizer;
pub mod transport;

pub use error::{SyncError, SyncResult};
pub use resource::{Resource, StatusResource};
pub use session::Session;
pub use synchronizer::{CollectionEvent, ViewSynchronizer};
pub use transport::RestTransport;

/// The one explicitly constructed client object views receive.
///
/// Each collection gets its own synchronizer over the shared transport, so
/// appointments, leads and patients can be in flight independently while
/// the session cookie is common to all of them.
pub struct ClinicClient {
    pub session: Session,
    pub appointments: ViewSynchronizer<Appointment>,
    pub leads: ViewSynchronizer<Lead>,
    pub patients: ViewSynchronizer<Patient>,
}

impl ClinicClient {
    pub fn new(server_url: impl Into<String>) -> anyhow::Result<Self> {
        let transport = Arc::new(RestTransport::new(server_url)?);
        Ok(Self {
            session: Session::new(Arc::clone(&transport)),
            appointments: ViewSynchronizer::new(Arc::clone(&transport)),
            leads: ViewSynchronizer::new(Arc::clone(&transport)),
            patients: ViewSynchronizer::new(transport),
        })
    }

    /// Aborts everything in flight across all collections; used when the
    /// whole UI is torn down.
    pub async fn detach_all(&self) {
        self.appointments.detach().await;
        self.leads.detach().await;
        self.patients.detach().await;
    }
}
