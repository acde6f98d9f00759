use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Patient;

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Patient>>;
    async fn find_all(&self) -> Result<Vec<Patient>>;
    async fn insert(&self, patient: Patient) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryPatientDirectory {
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl InMemoryPatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        Self {
            patients: RwLock::new(patients.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

#[async_trait]
impl PatientDirectory for InMemoryPatientDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>> {
        Ok(self.patients.read().await.get(&id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Patient>> {
        let patients = self.patients.read().await;
        let mut all: Vec<Patient> = patients.values().cloned().collect();
        all.sort_by_key(|p| (p.created_at, p.id));
        Ok(all)
    }

    async fn insert(&self, patient: Patient) -> Result<()> {
        let mut patients = self.patients.write().await;
        if patients.contains_key(&patient.id) {
            return Err(anyhow!("Patient {} already exists", patient.id));
        }
        patients.insert(patient.id, patient);
        Ok(())
    }
}
