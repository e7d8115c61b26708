//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations`. The generated
//! `apparel.location` geography column is omitted because Diesel has no
//! native PostGIS type; spatial queries reach it through raw SQL.

diesel::table! {
    /// Registered accounts with their reward state.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Public handle (max 64 characters).
        username -> Varchar,
        /// Lower-cased login email, unique.
        email -> Varchar,
        /// Argon2 PHC-format password digest.
        password_hash -> Text,
        /// Accumulated reward points (never negative).
        points -> Int4,
        /// Badges in award order.
        badges -> Array<Text>,
        is_admin -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Apparel submissions. Immutable once written.
    apparel (id) {
        id -> Uuid,
        /// Owning user; foreign key to `users.id`.
        user_id -> Uuid,
        apparel_type -> Varchar,
        /// One of `new`, `like_new`, `good`, `fair`, `poor`.
        condition -> Varchar,
        size -> Varchar,
        description -> Text,
        image_url -> Text,
        longitude -> Float8,
        latitude -> Float8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(apparel -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, apparel);
