use std::{fmt::Debug, fmt::Display, hash::Hash};

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        Appointment, AppointmentId, AppointmentStatus, Lead, LeadId, LeadStatus, Patient,
        PatientId,
    },
    protocol::{
        AppointmentDraft, AppointmentPatch, LeadDraft, LeadPatch, PatientDraft, PatientPatch,
    },
};

/// Binds a mirrored record type to its REST collection.
pub trait Resource:
    Clone + Debug + PartialEq + DeserializeOwned + Send + Sync + 'static
{
    type Id: Copy + Eq + Hash + Display + Debug + Send + Sync + 'static;
    type Draft: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync;

    /// Path segment under `/api/v1/`.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;
}

/// Records with a lifecycle field reachable via the status subresource.
pub trait StatusResource: Resource {
    type Status: Serialize + Copy + Debug + Send + Sync + 'static;
}

impl Resource for Appointment {
    type Id = AppointmentId;
    type Draft = AppointmentDraft;
    type Patch = AppointmentPatch;

    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> AppointmentId {
        self.id
    }
}

impl StatusResource for Appointment {
    type Status = AppointmentStatus;
}

impl Resource for Lead {
    type Id = LeadId;
    type Draft = LeadDraft;
    type Patch = LeadPatch;

    const COLLECTION: &'static str = "leads";

    fn id(&self) -> LeadId {
        self.id
    }
}

impl StatusResource for Lead {
    type Status = LeadStatus;
}

impl Resource for Patient {
    type Id = PatientId;
    type Draft = PatientDraft;
    type Patch = PatientPatch;

    const COLLECTION: &'static str = "patients";

    fn id(&self) -> PatientId {
        self.id
    }
}
