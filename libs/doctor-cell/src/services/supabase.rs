use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, Specialty};
use crate::services::directory::DoctorDirectory;

/// Doctor directory backed by the `doctors` table.
pub struct SupabaseDoctorDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Doctor>> {
        let path = format!("/rest/v1/doctors?{}", query);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await?;

        let doctors: Vec<Doctor> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()
            .map_err(|e| anyhow!("Failed to parse doctors: {}", e))?;

        Ok(doctors)
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn find_by_specialty(&self, specialty: Specialty) -> Result<Vec<Doctor>> {
        debug!("Fetching {} doctors", specialty);
        self.fetch(&format!(
            "specialty=eq.{}&order=created_at.asc,id.asc",
            urlencoding::encode(specialty.as_str())
        )).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>> {
        Ok(self.fetch(&format!("id=eq.{}", id)).await?.into_iter().next())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Doctor>> {
        Ok(self.fetch(&format!("user_id=eq.{}", user_id)).await?.into_iter().next())
    }

    async fn insert(&self, doctor: Doctor) -> Result<()> {
        debug!("Inserting doctor {}", doctor.id);
        let body = serde_json::to_value(&doctor)?;

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/doctors",
            None,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to create doctor {}", doctor.id));
        }

        Ok(())
    }
}
