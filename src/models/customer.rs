// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,

    #[schema(example = "Acme Utilities")]
    pub company_name: String,

    /// Contact person.
    #[schema(example = "Dana Contact")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    #[schema(value_type = Option<Address>)]
    pub address: Option<Json<Address>>,

    pub notes: Option<String>,

    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Fields embedded in job listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    pub company_name: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&Customer> for CustomerSummary {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            company_name: c.company_name.clone(),
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub company_name: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, max = 200, message = "Company name is required and must be less than 200 characters"))]
    #[schema(example = "Acme Utilities")]
    pub company_name: String,

    #[validate(length(max = 200))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    pub address: Option<Address>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<CreateCustomerPayload> for NewCustomer {
    fn from(p: CreateCustomerPayload) -> Self {
        Self {
            company_name: p.company_name.trim().to_string(),
            name: p.name.map(|n| n.trim().to_string()),
            email: p.email.map(|e| e.trim().to_lowercase()),
            phone: p.phone,
            address: p.address,
            notes: p.notes,
        }
    }
}
