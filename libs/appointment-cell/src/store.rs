use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentSearchQuery};

/// Persistence for appointments. Each call is atomic on its own; nothing here
/// spans a read and a later write.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>>;
    async fn find_by_doctor_id(&self, doctor_id: Uuid) -> Result<Vec<Appointment>>;
    async fn find_by_patient_id(&self, patient_id: Uuid) -> Result<Vec<Appointment>>;
    async fn insert(&self, appointment: Appointment) -> Result<()>;
    /// Overwrites the record with the same id. Fails if there is none.
    async fn replace(&self, appointment: Appointment) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn search(&self, query: &AppointmentSearchQuery) -> Result<Vec<Appointment>>;
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_doctor_id(&self, doctor_id: Uuid) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().filter(|a| a.doctor_id == doctor_id).cloned().collect())
    }

    async fn find_by_patient_id(&self, patient_id: Uuid) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().filter(|a| a.patient_id == patient_id).cloned().collect())
    }

    async fn insert(&self, appointment: Appointment) -> Result<()> {
        let mut appointments = self.appointments.write().await;
        if appointments.iter().any(|a| a.id == appointment.id) {
            return Err(anyhow!("Appointment {} already exists", appointment.id));
        }
        appointments.push(appointment);
        Ok(())
    }

    async fn replace(&self, appointment: Appointment) -> Result<()> {
        let mut appointments = self.appointments.write().await;
        match appointments.iter_mut().find(|a| a.id == appointment.id) {
            Some(slot) => {
                *slot = appointment;
                Ok(())
            }
            None => Err(anyhow!("Appointment {} does not exist", appointment.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut appointments = self.appointments.write().await;
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        Ok(appointments.len() != before)
    }

    async fn search(&self, query: &AppointmentSearchQuery) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        let mut matching: Vec<Appointment> = appointments
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        query.sort(&mut matching);
        Ok(matching)
    }
}

// ==============================================================================
// SUPABASE
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Appointment>> {
        let path = format!("/rest/v1/appointments?{}", query);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| anyhow!("Failed to parse appointment: {}", e))
            })
            .collect()
    }

    fn search_path(query: &AppointmentSearchQuery) -> String {
        let mut filters = Vec::new();

        if let Some(doctor_id) = query.doctor_id {
            filters.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = query.patient_id {
            filters.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        if let Some(from) = query.from {
            filters.push(format!("appointment_time=gte.{}", encode_time(from)));
        }
        if let Some(bound) = query.upper_bound() {
            filters.push(format!("appointment_time=lt.{}", encode_time(bound)));
        }

        let mut order = format!("{}.{}", query.sort_by.column(), query.direction.as_postgrest());
        if query.sort_by.column() != "appointment_time" {
            order.push_str(",appointment_time.asc");
        }
        filters.push(format!("order={}", order));

        filters.join("&")
    }
}

fn encode_time(time: DateTime<Utc>) -> String {
    urlencoding::encode(&time.to_rfc3339()).into_owned()
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        debug!("Fetching appointment {}", id);
        Ok(self.fetch(&format!("id=eq.{}", id)).await?.into_iter().next())
    }

    async fn find_by_doctor_id(&self, doctor_id: Uuid) -> Result<Vec<Appointment>> {
        debug!("Fetching appointments for doctor {}", doctor_id);
        self.fetch(&format!("doctor_id=eq.{}&order=appointment_time.asc", doctor_id)).await
    }

    async fn find_by_patient_id(&self, patient_id: Uuid) -> Result<Vec<Appointment>> {
        debug!("Fetching appointments for patient {}", patient_id);
        self.fetch(&format!("patient_id=eq.{}&order=appointment_time.asc", patient_id)).await
    }

    async fn insert(&self, appointment: Appointment) -> Result<()> {
        let body = serde_json::to_value(&appointment)?;
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            None,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to create appointment {}", appointment.id));
        }
        Ok(())
    }

    async fn replace(&self, appointment: Appointment) -> Result<()> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let body = serde_json::to_value(&appointment)?;
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            None,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if result.is_empty() {
            return Err(anyhow!("Appointment {} does not exist", appointment.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            None,
            Some(SupabaseClient::representation_headers()),
        ).await?;

        Ok(!result.is_empty())
    }

    async fn search(&self, query: &AppointmentSearchQuery) -> Result<Vec<Appointment>> {
        let query_string = Self::search_path(query);
        debug!("Searching appointments: {}", query_string);
        self.fetch(&query_string).await
    }
}
