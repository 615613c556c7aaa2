//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::reporting::{
    BookingReportRow, BookingsReport, DashboardSummary, MonthlyRevenue, StatusCount,
    UtilizationReport, VehicleUtilization,
};
use crate::application::{
    BookingJobsConfig, BookingService, CustomerService, IdentityService, ReportService,
    VehicleService,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, MessageResponse, PaginatedResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};

use super::modules::{
    auth, bookings, customers, health, metrics, reports, request_id, vehicles,
};

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
                        .description(Some("Access token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::refresh,
        auth::me,
        auth::change_password,
        // Customers
        customers::get_profile,
        customers::update_profile,
        customers::list_customers,
        customers::get_customer,
        customers::set_customer_status,
        // Vehicles
        vehicles::list_vehicles,
        vehicles::available_vehicles,
        vehicles::get_vehicle,
        vehicles::create_vehicle,
        vehicles::update_vehicle,
        vehicles::delete_vehicle,
        // Bookings
        bookings::list_bookings,
        bookings::bookings_by_status,
        bookings::get_booking,
        bookings::create_booking,
        bookings::update_booking,
        bookings::delete_booking,
        bookings::approve_booking,
        bookings::reject_booking,
        bookings::run_jobs,
        // Reports
        reports::dashboard,
        reports::bookings_report,
        reports::vehicle_utilization,
        reports::monthly_revenue,
    ),
    components(
        schemas(
            ApiResponse<String>,
            MessageResponse,
            health::HealthResponse,
            health::ComponentHealth,
            auth::RegisterRequest,
            auth::RegisterResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RefreshRequest,
            auth::RefreshResponse,
            auth::AccountInfo,
            auth::ChangePasswordRequest,
            customers::CustomerDto,
            customers::UpdateProfileRequest,
            customers::SetCustomerStatusRequest,
            PaginatedResponse<customers::CustomerDto>,
            vehicles::VehicleDto,
            vehicles::CreateVehicleRequest,
            vehicles::UpdateVehicleRequest,
            PaginatedResponse<vehicles::VehicleDto>,
            bookings::BookingDto,
            bookings::CreateBookingRequest,
            bookings::UpdateBookingRequest,
            bookings::BookingStatusGroupDto,
            bookings::JobRunResponse,
            PaginatedResponse<bookings::BookingDto>,
            StatusCount,
            DashboardSummary,
            BookingReportRow,
            BookingsReport,
            VehicleUtilization,
            UtilizationReport,
            MonthlyRevenue,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Registration, JWT login and refresh, password change"),
        (name = "Customers", description = "Customer profiles and their administration"),
        (name = "Vehicles", description = "Vehicle catalog and availability search"),
        (name = "Bookings", description = "Booking lifecycle: create, edit, approve, reject"),
        (name = "Reports", description = "Staff reports over bookings and the fleet"),
    ),
    info(
        title = "Rentcar API",
        version = "1.0.0",
        description = "REST API for vehicle rental: customers, fleet, bookings and reports",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the full HTTP application
pub fn create_api_router(
    repos: Arc<dyn RepositoryProvider>,
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    jobs_config: BookingJobsConfig,
    prometheus: PrometheusHandle,
) -> Router {
    let auth_layer_state = AuthState {
        jwt_config: jwt_config.clone(),
    };
    let require_auth =
        || middleware::from_fn_with_state(auth_layer_state.clone(), auth_middleware);

    // ── Auth ────────────────────────────────────────────────────
    let auth_state = auth::AuthHandlerState {
        identity: Arc::new(IdentityService::new(repos.clone(), jwt_config)),
    };

    let auth_public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .with_state(auth_state.clone());

    let auth_protected = Router::new()
        .route("/me", get(auth::me))
        .route("/change-password", put(auth::change_password))
        .layer(require_auth())
        .with_state(auth_state);

    // ── Customers ───────────────────────────────────────────────
    let customer_routes = Router::new()
        .route("/", get(customers::list_customers))
        .route(
            "/profile",
            get(customers::get_profile).put(customers::update_profile),
        )
        .route("/{id}", get(customers::get_customer))
        .route("/{id}/status", put(customers::set_customer_status))
        .layer(require_auth())
        .with_state(customers::CustomerHandlerState {
            customers: Arc::new(CustomerService::new(repos.clone())),
        });

    // ── Vehicles ────────────────────────────────────────────────
    let vehicle_routes = Router::new()
        .route(
            "/",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route("/available", get(vehicles::available_vehicles))
        .route(
            "/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .layer(require_auth())
        .with_state(vehicles::VehicleHandlerState {
            vehicles: Arc::new(VehicleService::new(repos.clone())),
        });

    // ── Bookings ────────────────────────────────────────────────
    let booking_routes = Router::new()
        .route(
            "/",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/by-status", get(bookings::bookings_by_status))
        .route("/jobs/run", post(bookings::run_jobs))
        .route(
            "/{id}",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/{id}/approve", post(bookings::approve_booking))
        .route("/{id}/reject", post(bookings::reject_booking))
        .layer(require_auth())
        .with_state(bookings::BookingHandlerState {
            bookings: Arc::new(BookingService::new(repos.clone())),
            repos: repos.clone(),
            jobs_config,
        });

    // ── Reports ─────────────────────────────────────────────────
    let report_routes = Router::new()
        .route("/dashboard", get(reports::dashboard))
        .route("/bookings", get(reports::bookings_report))
        .route("/vehicle-utilization", get(reports::vehicle_utilization))
        .route("/monthly-revenue", get(reports::monthly_revenue))
        .layer(require_auth())
        .with_state(reports::ReportHandlerState {
            reports: Arc::new(ReportService::new(repos)),
        });

    // ── Public ──────────────────────────────────────────────────
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState { handle: prometheus });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/auth", auth_public.merge(auth_protected))
        .nest("/api/v1/customers", customer_routes)
        .nest("/api/v1/vehicles", vehicle_routes)
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/reports", report_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
}
