//! HTTP inbound adapter exposing the REST endpoints.

use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::domain::apparel::IMAGE_MAX_BYTES;

pub mod apparel;
pub mod auth;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Headroom for the text fields sent alongside the image.
const MULTIPART_TEXT_ALLOWANCE: usize = 64 * 1024;

/// Extractor settings turning malformed JSON, query and multipart payloads
/// into `400` error bodies.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    let multipart_limit = IMAGE_MAX_BYTES + MULTIPART_TEXT_ALLOWANCE;
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(
            MultipartFormConfig::default()
                .total_limit(multipart_limit)
                .memory_limit(multipart_limit)
                .error_handler(error::multipart_error_handler),
        );
}

/// Register extractor settings plus the account and apparel routes.
///
/// The caller supplies `web::Data<HttpState>`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    configure_extractors(cfg);
    users::configure(cfg);
    apparel::configure(cfg);
}
