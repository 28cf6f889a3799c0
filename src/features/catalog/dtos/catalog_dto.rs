use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::catalog::models::{Counter, Service, ServiceType};
use crate::shared::validation::CODE_REGEX;

/// Request DTO for creating a service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceDto {
    /// Short uppercase code, also used as the ticket prefix (e.g. "PAY")
    #[validate(
        regex(
            path = *CODE_REGEX,
            message = "Code must be uppercase alphanumeric (hyphens allowed)"
        ),
        length(min = 1, max = 8, message = "Code must be 1-8 characters")
    )]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Request DTO for renaming a service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Request DTO for creating a service type under a service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceTypeDto {
    #[validate(
        regex(
            path = *CODE_REGEX,
            message = "Code must be uppercase alphanumeric (hyphens allowed)"
        ),
        length(min = 1, max = 16, message = "Code must be 1-16 characters")
    )]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Request DTO for creating a counter under a service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCounterDto {
    #[validate(
        regex(
            path = *CODE_REGEX,
            message = "Code must be uppercase alphanumeric (hyphens allowed)"
        ),
        length(min = 1, max = 16, message = "Code must be 1-16 characters")
    )]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Request DTO for renaming a counter
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCounterDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Response DTO for a service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponseDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Service> for ServiceResponseDto {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            code: s.code,
            name: s.name,
            created_at: s.created_at,
        }
    }
}

/// Response DTO for a service type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeResponseDto {
    pub id: Uuid,
    pub service_id: Uuid,
    pub code: String,
    pub name: String,
}

impl From<ServiceType> for ServiceTypeResponseDto {
    fn from(t: ServiceType) -> Self {
        Self {
            id: t.id,
            service_id: t.service_id,
            code: t.code,
            name: t.name,
        }
    }
}

/// Response DTO for a counter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterResponseDto {
    pub id: Uuid,
    pub service_id: Uuid,
    pub code: String,
    pub name: String,
}

impl From<Counter> for CounterResponseDto {
    fn from(c: Counter) -> Self {
        Self {
            id: c.id,
            service_id: c.service_id,
            code: c.code,
            name: c.name,
        }
    }
}
