//! Shared request and result types for the user services

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crewdesk_database::User;

/// One record of a bulk-create request, as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Fields accepted by the update operation. Anything outside this
/// allow-list is ignored by deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

/// Field-indexed validation messages for a single record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }
}

/// Validation messages for a whole batch, keyed by record index.
/// Serializes as an object with stringified indices, matching the
/// per-index error shape of the HTTP contract.
pub type BatchErrors = BTreeMap<usize, ValidationErrors>;

/// One page of users plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T = User> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub per_page: u32,
    pub total: i64,
    pub last_page: u32,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, current_page: u32, per_page: u32, total: i64) -> Self {
        let last_page = if total <= 0 {
            1
        } else {
            ((total + i64::from(per_page) - 1) / i64::from(per_page)) as u32
        };

        Self {
            current_page,
            data,
            per_page,
            total,
            last_page,
        }
    }
}
