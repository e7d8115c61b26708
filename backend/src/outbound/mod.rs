//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL/PostGIS repositories using Diesel ORM
//! - **storage**: S3 object store for apparel photos
//! - **email**: SMTP delivery via `lettre`
//! - **security**: Argon2 password hashing and JWT bearer tokens
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod email;
pub mod persistence;
pub mod security;
pub mod storage;
