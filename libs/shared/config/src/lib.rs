use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_SESSION_DURATION_MINUTES: i64 = 60;
pub const DEFAULT_OPENING_HOUR: u32 = 10;
pub const DEFAULT_CLOSING_HOUR: u32 = 20;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// How concurrent bookings for the same doctor are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingGuardMode {
    /// No serialization between the conflict check and the insert. Two
    /// concurrent bookings for one doctor can both succeed.
    Unguarded,
    /// Per-doctor async lock held across validation and insert.
    PerDoctorLock,
}

impl Default for BookingGuardMode {
    fn default() -> Self {
        BookingGuardMode::PerDoctorLock
    }
}

impl FromStr for BookingGuardMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "unguarded" => Ok(BookingGuardMode::Unguarded),
            "per_doctor_lock" | "lock" => Ok(BookingGuardMode::PerDoctorLock),
            other => Err(format!("unknown booking guard mode: {}", other)),
        }
    }
}

/// Appointment scheduling options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub session_duration_minutes: i64,
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub booking_guard: BookingGuardMode,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            session_duration_minutes: DEFAULT_SESSION_DURATION_MINUTES,
            opening_hour: DEFAULT_OPENING_HOUR,
            closing_hour: DEFAULT_CLOSING_HOUR,
            booking_guard: BookingGuardMode::default(),
        }
    }
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut config = Self {
            session_duration_minutes: parse_var(
                "APPOINTMENT_SESSION_DURATION_MINUTES",
                defaults.session_duration_minutes,
            ),
            opening_hour: parse_var("APPOINTMENT_OPENING_HOUR", defaults.opening_hour),
            closing_hour: parse_var("APPOINTMENT_CLOSING_HOUR", defaults.closing_hour),
            booking_guard: parse_var("BOOKING_GUARD", defaults.booking_guard),
        };

        if config.session_duration_minutes <= 0 {
            warn!(
                "APPOINTMENT_SESSION_DURATION_MINUTES must be positive (got {}), using default",
                config.session_duration_minutes
            );
            config.session_duration_minutes = defaults.session_duration_minutes;
        }

        if !config.has_valid_business_hours() {
            warn!(
                "Invalid business hours {}..{}, using defaults",
                config.opening_hour, config.closing_hour
            );
            config.opening_hour = defaults.opening_hour;
            config.closing_hour = defaults.closing_hour;
        }

        config
    }

    pub fn has_valid_business_hours(&self) -> bool {
        self.opening_hour < self.closing_hour && self.closing_hour <= 24
    }

    pub fn session_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_duration_minutes)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub session_ttl_hours: i64,
    pub scheduling: SchedulingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            scheduling: SchedulingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS),
            scheduling: SchedulingConfig::from_env(),
        };

        if config.session_ttl_hours <= 0 {
            warn!("SESSION_TTL_HOURS must be positive, using default");
            config.session_ttl_hours = DEFAULT_SESSION_TTL_HOURS;
        }

        if !config.is_configured() {
            warn!("Supabase not configured - only in-memory stores are available");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {:?}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
