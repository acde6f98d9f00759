use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub email: String,
    pub specialty: Specialty,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Medical field used to pick candidate doctors for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    GeneralPractitioner,
    Cardiologist,
    Dermatologist,
    Neurologist,
    Pediatrician,
    Oncologist,
    Orthopedist,
    Psychiatrist,
    Endocrinologist,
    Gynecologist,
    Gastroenterologist,
}

impl Specialty {
    pub const ALL: [Specialty; 11] = [
        Specialty::GeneralPractitioner,
        Specialty::Cardiologist,
        Specialty::Dermatologist,
        Specialty::Neurologist,
        Specialty::Pediatrician,
        Specialty::Oncologist,
        Specialty::Orthopedist,
        Specialty::Psychiatrist,
        Specialty::Endocrinologist,
        Specialty::Gynecologist,
        Specialty::Gastroenterologist,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::GeneralPractitioner => "general_practitioner",
            Specialty::Cardiologist => "cardiologist",
            Specialty::Dermatologist => "dermatologist",
            Specialty::Neurologist => "neurologist",
            Specialty::Pediatrician => "pediatrician",
            Specialty::Oncologist => "oncologist",
            Specialty::Orthopedist => "orthopedist",
            Specialty::Psychiatrist => "psychiatrist",
            Specialty::Endocrinologist => "endocrinologist",
            Specialty::Gynecologist => "gynecologist",
            Specialty::Gastroenterologist => "gastroenterologist",
        }
    }
}

impl Default for Specialty {
    fn default() -> Self {
        Specialty::GeneralPractitioner
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Specialty::ALL
            .iter()
            .copied()
            .find(|specialty| specialty.as_str() == wanted)
            .ok_or_else(|| format!("unknown specialty: {}", value))
    }
}
