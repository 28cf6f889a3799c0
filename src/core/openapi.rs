use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::catalog::{dtos as catalog_dtos, handlers as catalog_handlers};
use crate::features::display::{dtos as display_dtos, handlers as display_handlers};
use crate::features::realtime::handlers as realtime_handlers;
use crate::features::stats::{dtos as stats_dtos, handlers as stats_handlers};
use crate::features::tickets::{
    dtos as tickets_dtos, handlers as tickets_handlers, models as tickets_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Kiosk
        tickets_handlers::create_ticket,
        // Counters
        tickets_handlers::call_next,
        tickets_handlers::current,
        tickets_handlers::ring_bell,
        // Tickets
        tickets_handlers::get_ticket,
        tickets_handlers::serve_ticket,
        tickets_handlers::complete_ticket,
        tickets_handlers::lapse_ticket,
        tickets_handlers::cancel_ticket,
        tickets_handlers::recall_ticket,
        tickets_handlers::transfer_ticket,
        // Display
        display_handlers::service_board,
        // Events
        realtime_handlers::global_events,
        realtime_handlers::service_events,
        realtime_handlers::counter_events,
        // Reports
        stats_handlers::my_report,
        stats_handlers::service_report,
        // Catalog
        catalog_handlers::create_service,
        catalog_handlers::list_services,
        catalog_handlers::get_service,
        catalog_handlers::update_service,
        catalog_handlers::create_service_type,
        catalog_handlers::list_service_types,
        catalog_handlers::create_counter,
        catalog_handlers::list_counters,
        catalog_handlers::update_counter,
        // Users
        users_handlers::get_me,
        users_handlers::assign_counter,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            // Tickets
            tickets_models::TicketStatus,
            tickets_dtos::CreateTicketDto,
            tickets_dtos::ServeTicketDto,
            tickets_dtos::CompleteTicketDto,
            tickets_dtos::LapseTicketDto,
            tickets_dtos::CancelTicketDto,
            tickets_dtos::RecallTicketDto,
            tickets_dtos::TransferTicketDto,
            tickets_dtos::TicketResponseDto,
            ApiResponse<tickets_dtos::TicketResponseDto>,
            // Display
            display_dtos::CounterBoardDto,
            display_dtos::DisplayBoardDto,
            ApiResponse<display_dtos::DisplayBoardDto>,
            // Reports
            stats_dtos::DayCountDto,
            stats_dtos::TypeCountDto,
            stats_dtos::ReportTicketDto,
            stats_dtos::QueueReportDto,
            stats_dtos::StaffTotals,
            ApiResponse<stats_dtos::QueueReportDto>,
            // Catalog
            catalog_dtos::CreateServiceDto,
            catalog_dtos::UpdateServiceDto,
            catalog_dtos::ServiceResponseDto,
            catalog_dtos::CreateServiceTypeDto,
            catalog_dtos::ServiceTypeResponseDto,
            catalog_dtos::CreateCounterDto,
            catalog_dtos::UpdateCounterDto,
            catalog_dtos::CounterResponseDto,
            ApiResponse<catalog_dtos::ServiceResponseDto>,
            ApiResponse<Vec<catalog_dtos::ServiceResponseDto>>,
            ApiResponse<catalog_dtos::ServiceTypeResponseDto>,
            ApiResponse<Vec<catalog_dtos::ServiceTypeResponseDto>>,
            ApiResponse<catalog_dtos::CounterResponseDto>,
            ApiResponse<Vec<catalog_dtos::CounterResponseDto>>,
            // Users
            users_dtos::AssignCounterDto,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
        )
    ),
    tags(
        (name = "kiosk", description = "Self-service ticket issuing (public)"),
        (name = "counters", description = "Counter-side queue dispatch"),
        (name = "tickets", description = "Ticket lifecycle operations"),
        (name = "display", description = "Waiting-room display boards (public)"),
        (name = "events", description = "Server-sent event streams (public)"),
        (name = "reports", description = "Served-ticket statistics"),
        (name = "catalog", description = "Services, service types and counters"),
        (name = "users", description = "Staff profiles and counter assignment"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "QueueDesk API",
        version = "0.1.0",
        description = "API documentation for QueueDesk",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
