//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the DTO schemas
//! they exchange and the bearer-JWT security scheme. Swagger UI serves it in
//! debug builds; `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::apparel::{ApparelResponse, ApparelUploadSchema, PointResponse};
use crate::inbound::http::error::ErrorResponse;
use crate::inbound::http::users::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token returned by POST /auth/register or /auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Loopwear API",
        description = "Apparel recycling: accounts, submissions, rewards and nearby search."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("bearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::profile,
        crate::inbound::http::apparel::submit_apparel,
        crate::inbound::http::apparel::list_apparel,
        crate::inbound::http::apparel::nearby_apparel,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        ProfileResponse,
        ApparelUploadSchema,
        ApparelResponse,
        PointResponse,
        ErrorResponse
    )),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "apparel", description = "Submissions and nearby search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
