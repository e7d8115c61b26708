//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Array, Bool, Int4, Text, Uuid as SqlUuid};
use uuid::Uuid;

use super::schema::{apparel, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub points: i32,
    pub badges: Vec<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub points: i32,
    pub badges: Vec<&'a str>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result row of the atomic reward update.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct RewardRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = Text)]
    pub username: String,
    #[diesel(sql_type = Text)]
    pub email: String,
    #[diesel(sql_type = Int4)]
    pub points: i32,
    #[diesel(sql_type = Array<Text>)]
    pub badges: Vec<String>,
    #[diesel(sql_type = Bool)]
    pub is_admin: bool,
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Bool)]
    pub badge_awarded: bool,
}

/// Row struct for apparel records, usable from the query builder and from
/// raw spatial SQL alike.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = apparel)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApparelRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub apparel_type: String,
    pub condition: String,
    pub size: String,
    pub description: String,
    pub image_url: String,
    pub longitude: f64,
    pub latitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new apparel records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = apparel)]
pub(crate) struct NewApparelRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub apparel_type: &'a str,
    pub condition: &'a str,
    pub size: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub longitude: f64,
    pub latitude: f64,
    pub created_at: DateTime<Utc>,
}
