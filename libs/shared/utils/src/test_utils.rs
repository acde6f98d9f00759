use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, BookingGuardMode, SchedulingConfig};

use crate::clock::ManualClock;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub booking_guard: BookingGuardMode,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            booking_guard: BookingGuardMode::PerDoctorLock,
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            session_ttl_hours: 24,
            scheduling: SchedulingConfig {
                booking_guard: self.booking_guard,
                ..SchedulingConfig::default()
            },
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Reference "now" for deterministic tests: Tuesday 2030-01-01 08:00 UTC.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// `days_ahead` days after [`fixed_now`], at `hour:minute` UTC.
pub fn at(days_ahead: i64, hour: u32, minute: u32) -> DateTime<Utc> {
    let day = fixed_now().date_naive() + Duration::days(days_ahead);
    day.and_hms_opt(hour, minute, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_else(fixed_now)
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(fixed_now()))
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(id: Uuid, user_id: Uuid, first_name: &str, specialty: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "first_name": first_name,
            "last_name": "Test",
            "birth_date": "1980-05-17",
            "phone": "+10000000000",
            "email": format!("{}@example.com", first_name.to_lowercase()),
            "specialty": specialty,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_response(id: Uuid, user_id: Uuid) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "first_name": "Test",
            "last_name": "Patient",
            "birth_date": "1990-01-01",
            "phone": "+10000000001",
            "email": "patient@example.com",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        id: Uuid,
        patient_id: Uuid,
        doctor_id: Uuid,
        appointment_time: DateTime<Utc>,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_time": appointment_time,
            "status": status,
            "notes": null,
            "doctor_notes": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default().to_app_config();

        assert_eq!(config.supabase_url, "http://localhost:54321");
        assert_eq!(config.supabase_anon_key, "test-anon-key");
        assert!(config.is_configured());
        assert_eq!(config.scheduling.booking_guard, BookingGuardMode::PerDoctorLock);
    }

    #[test]
    fn at_builds_future_instants() {
        let slot = at(1, 14, 30);
        assert_eq!(slot.day(), 2);
        assert_eq!(slot.hour(), 14);
        assert_eq!(slot.minute(), 30);
        assert!(slot > fixed_now());
        assert_eq!(manual_clock().now(), fixed_now());
    }
}
