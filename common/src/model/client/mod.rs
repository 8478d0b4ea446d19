//! Client model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Client model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Client {
    /// Unique client ID, assigned on first save
    pub id: i64,
    /// Identification document type (e.g. "CC", "PASSPORT")
    pub identification_type: String,
    /// Identification document number, unique per client
    pub identification_number: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Date of birth
    pub birthdate: NaiveDate,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Whether someone born on `birthdate` has turned 18 as of `today`
pub fn is_adult(birthdate: NaiveDate, today: NaiveDate) -> bool {
    match birthdate.checked_add_months(chrono::Months::new(12 * 18)) {
        Some(eighteenth) => eighteenth <= today,
        None => false,
    }
}

impl Client {
    /// Whether the client is at least 18 years old as of `today`
    pub fn is_adult(&self, today: NaiveDate) -> bool {
        is_adult(self.birthdate, today)
    }
}

/// Inbound shape for onboarding a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct NewClient {
    pub identification_type: String,
    pub identification_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthdate: NaiveDate,
}

/// Fields a client update may change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct ClientUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(birthdate: NaiveDate) -> Client {
        Client {
            id: 1,
            identification_type: "CC".to_string(),
            identification_number: "100".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            birthdate,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn adulthood_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();

        let of_age = client(NaiveDate::from_ymd_opt(2008, 6, 1).unwrap());
        assert!(of_age.is_adult(today));

        let underage = client(NaiveDate::from_ymd_opt(2008, 6, 2).unwrap());
        assert!(!underage.is_adult(today));
    }
}
