#![allow(clippy::needless_for_each)]

use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::ipc::get_latest_ipc,
        handlers::rent::get_rent_table,
        handlers::admin::get_admin_status,
        handlers::admin::clear_cache,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "IPC", description = "Monthly consumer price index variation"),
        (name = "Alquiler", description = "Rent adjustment schedules"),
        (name = "Admin", description = "Dataset source administration")
    )
)]
pub struct ApiDoc;
