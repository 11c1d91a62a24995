// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::log::Tracing;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::RustBlastResult;
use crate::modules::{settings::cli::SETTINGS, utils::shutdown::shutdown_signal};

use super::error::ApiErrorResponse;
use crate::raise_error;
use api::create_openapi_service;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Compression};
use poem::{middleware::Cors, EndpointExt, Route, Server};
use poem_openapi::ContactObject;
use std::time::Duration;

pub mod api;
pub mod response;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

const DESCRIPTION: &str = r#"
    RustBlast is a self-hosted WhatsApp campaign dispatch service for teams that run recurring broadcast messaging.

    - Manages a contact directory with groups, custom fields and uploaded files.
    - Renders per-recipient message templates, matches attachments by name and tracks delivery per recipient.
    - Sends through interchangeable providers (Fonnte cloud API or a self-hosted Baileys gateway) with anti-ban pacing.

    Campaigns can be dispatched immediately or scheduled, and delivery state can be re-synchronized from the provider at any time.
"#;

pub async fn start_http_server() -> RustBlastResult<()> {
    let listener = TcpListener::bind((
        SETTINGS
            .rustblast_bind_ip
            .clone()
            .unwrap_or("0.0.0.0".into()),
        SETTINGS.rustblast_http_port as u16,
    ));

    let api_service = create_openapi_service()
        .description(DESCRIPTION)
        .contact(ContactObject::new().email("rustblast.git@gmail.com"))
        .summary("A self-hosted WhatsApp campaign dispatch service");

    let swagger = api_service.swagger_ui();
    let redoc = api_service.redoc();
    let scalar = api_service.scalar();
    let spec_json = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let openapi_explorer = api_service.openapi_explorer();

    let open_api_route = Route::new()
        .nest_no_strip("/api/v1", api_service)
        .with(Tracing);

    let mut cors_origins = SETTINGS.rustblast_cors_origins.clone();
    if cors_origins.is_empty() {
        cors_origins = ["*".to_string()].into_iter().collect();
    }

    let cors = Cors::new()
        .allow_origins(cors_origins)
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"])
        .allow_headers(vec!["Content-Type", "Authorization"])
        .expose_headers(vec!["Accept"])
        .max_age(SETTINGS.rustblast_cors_max_age);

    let route = Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/redoc", redoc)
        .nest("/api-docs/explorer", openapi_explorer)
        .nest("/api-docs/scalar", scalar)
        .nest("/api-docs/spec.json", spec_json)
        .nest("/api-docs/spec.yaml", spec_yaml)
        .nest_no_strip("/api/v1", open_api_route)
        .with(cors)
        .with_if(
            SETTINGS.rustblast_http_compression_enabled,
            Compression::new(),
        )
        .with(CatchPanic::new());

    let server = Server::new(listener)
        .name("RustBlast API Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            route.catch_all_error(error_handler),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    println!(
        "RustBlast API Service is now running on port {}.",
        SETTINGS.rustblast_http_port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
