use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DAYS_PER_YEAR: f64 = 365.2425;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Fractional age at `now`, using the mean Gregorian year.
    pub fn age_in_years(&self, now: DateTime<Utc>) -> f64 {
        let born = self.birth_date.and_time(NaiveTime::MIN).and_utc();
        let days = (now - born).num_milliseconds() as f64 / MILLIS_PER_DAY;
        days / DAYS_PER_YEAR
    }
}
