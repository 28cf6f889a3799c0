use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::dtos::*;
use crate::features::catalog::models::{Counter, Service, ServiceType};

/// CRUD over the service/counter catalog. Catalog rows are never deleted;
/// tickets reference them forever for reporting.
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_service(&self, dto: CreateServiceDto) -> Result<ServiceResponseDto> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (code, name)
            VALUES ($1, $2)
            RETURNING id, code, name, created_at, updated_at
            "#,
        )
        .bind(&dto.code)
        .bind(&dto.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation(format!("Service code '{}' already exists", dto.code))
            }
            _ => {
                tracing::error!("Failed to create service: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("Service created: id={}, code={}", service.id, service.code);
        Ok(service.into())
    }

    pub async fn list_services(&self) -> Result<Vec<ServiceResponseDto>> {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, code, name, created_at, updated_at
            FROM services
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list services: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(services.into_iter().map(|s| s.into()).collect())
    }

    pub async fn get_service(&self, id: Uuid) -> Result<ServiceResponseDto> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, code, name, created_at, updated_at
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get service: {:?}", e);
            AppError::Database(e)
        })?;

        service
            .map(|s| s.into())
            .ok_or_else(|| AppError::NotFound(format!("Service '{}' not found", id)))
    }

    pub async fn update_service(&self, id: Uuid, dto: UpdateServiceDto) -> Result<ServiceResponseDto> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, code, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&dto.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update service: {:?}", e);
            AppError::Database(e)
        })?;

        service
            .map(|s| s.into())
            .ok_or_else(|| AppError::NotFound(format!("Service '{}' not found", id)))
    }

    pub async fn create_service_type(
        &self,
        service_id: Uuid,
        dto: CreateServiceTypeDto,
    ) -> Result<ServiceTypeResponseDto> {
        // Parent must exist; FK alone would surface as an opaque 500.
        self.get_service(service_id).await?;

        let service_type = sqlx::query_as::<_, ServiceType>(
            r#"
            INSERT INTO service_types (service_id, code, name)
            VALUES ($1, $2, $3)
            RETURNING id, service_id, code, name, created_at, updated_at
            "#,
        )
        .bind(service_id)
        .bind(&dto.code)
        .bind(&dto.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Validation(format!(
                "Service type code '{}' already exists for this service",
                dto.code
            )),
            _ => {
                tracing::error!("Failed to create service type: {:?}", e);
                AppError::Database(e)
            }
        })?;

        Ok(service_type.into())
    }

    pub async fn list_service_types(&self, service_id: Uuid) -> Result<Vec<ServiceTypeResponseDto>> {
        let types = sqlx::query_as::<_, ServiceType>(
            r#"
            SELECT id, service_id, code, name, created_at, updated_at
            FROM service_types
            WHERE service_id = $1
            ORDER BY code
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list service types: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(types.into_iter().map(|t| t.into()).collect())
    }

    pub async fn create_counter(
        &self,
        service_id: Uuid,
        dto: CreateCounterDto,
    ) -> Result<CounterResponseDto> {
        self.get_service(service_id).await?;

        let counter = sqlx::query_as::<_, Counter>(
            r#"
            INSERT INTO counters (service_id, code, name)
            VALUES ($1, $2, $3)
            RETURNING id, service_id, code, name, created_at, updated_at
            "#,
        )
        .bind(service_id)
        .bind(&dto.code)
        .bind(&dto.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Validation(format!(
                "Counter code '{}' already exists for this service",
                dto.code
            )),
            _ => {
                tracing::error!("Failed to create counter: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!(
            "Counter created: id={}, service={}, code={}",
            counter.id,
            counter.service_id,
            counter.code
        );
        Ok(counter.into())
    }

    pub async fn list_counters(&self, service_id: Uuid) -> Result<Vec<CounterResponseDto>> {
        let counters = sqlx::query_as::<_, Counter>(
            r#"
            SELECT id, service_id, code, name, created_at, updated_at
            FROM counters
            WHERE service_id = $1
            ORDER BY code
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list counters: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(counters.into_iter().map(|c| c.into()).collect())
    }

    pub async fn update_counter(&self, id: Uuid, dto: UpdateCounterDto) -> Result<CounterResponseDto> {
        let counter = sqlx::query_as::<_, Counter>(
            r#"
            UPDATE counters
            SET name = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, service_id, code, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&dto.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update counter: {:?}", e);
            AppError::Database(e)
        })?;

        counter
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Counter '{}' not found", id)))
    }
}
