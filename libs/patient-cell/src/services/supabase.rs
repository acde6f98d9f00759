use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::Patient;
use crate::services::directory::PatientDirectory;

pub struct SupabasePatientDirectory {
    supabase: SupabaseClient,
}

impl SupabasePatientDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn fetch_one(&self, filter: &str) -> Result<Option<Patient>> {
        let path = format!("/rest/v1/patients?{}&limit=1", filter);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        match result.into_iter().next() {
            Some(row) => {
                let patient: Patient = serde_json::from_value(row)
                    .map_err(|e| anyhow!("Failed to parse patient: {}", e))?;
                Ok(Some(patient))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PatientDirectory for SupabasePatientDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>> {
        debug!("Fetching patient {}", id);
        self.fetch_one(&format!("id=eq.{}", id)).await
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Patient>> {
        debug!("Fetching patient for user {}", user_id);
        self.fetch_one(&format!("user_id=eq.{}", user_id)).await
    }

    async fn find_all(&self) -> Result<Vec<Patient>> {
        debug!("Fetching all patients");
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/patients?order=created_at.asc", None, None)
            .await?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| anyhow!("Failed to parse patient: {}", e))
            })
            .collect()
    }

    async fn insert(&self, patient: Patient) -> Result<()> {
        let body = serde_json::to_value(&patient)?;
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/patients",
            None,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to create patient profile"));
        }

        debug!("Patient profile created with ID: {}", patient.id);
        Ok(())
    }
}
