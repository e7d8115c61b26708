//! Loopwear backend library: apparel recycling with points and badges.
//!
//! Layout follows a hexagonal split: `domain` holds types, services and
//! ports; `inbound::http` adapts Actix Web requests; `outbound` implements
//! the driven ports against PostgreSQL, S3 and SMTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
