use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Doctor, Specialty};

/// Read/write access to doctor profiles.
///
/// `find_by_specialty` returns doctors in the order the backing store yields
/// them; callers doing first-fit selection inherit that order.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_by_specialty(&self, specialty: Specialty) -> Result<Vec<Doctor>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Doctor>>;
    async fn insert(&self, doctor: Doctor) -> Result<()>;
}

/// Process-local directory that keeps insertion order.
#[derive(Default)]
pub struct InMemoryDoctorDirectory {
    doctors: RwLock<Vec<Doctor>>,
}

impl InMemoryDoctorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doctors(doctors: Vec<Doctor>) -> Self {
        Self {
            doctors: RwLock::new(doctors),
        }
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDoctorDirectory {
    async fn find_by_specialty(&self, specialty: Specialty) -> Result<Vec<Doctor>> {
        let doctors = self.doctors.read().await;
        let matching: Vec<Doctor> = doctors
            .iter()
            .filter(|doctor| doctor.specialty == specialty)
            .cloned()
            .collect();

        debug!("Found {} {} doctors", matching.len(), specialty);
        Ok(matching)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>> {
        let doctors = self.doctors.read().await;
        Ok(doctors.iter().find(|doctor| doctor.id == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Doctor>> {
        let doctors = self.doctors.read().await;
        Ok(doctors.iter().find(|doctor| doctor.user_id == user_id).cloned())
    }

    async fn insert(&self, doctor: Doctor) -> Result<()> {
        let mut doctors = self.doctors.write().await;
        if doctors.iter().any(|existing| existing.id == doctor.id) {
            return Err(anyhow!("Doctor {} already exists", doctor.id));
        }
        doctors.push(doctor);
        Ok(())
    }
}
