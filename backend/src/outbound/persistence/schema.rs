//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//! When migrations change the schema, regenerate with `diesel print-schema`.

diesel::table! {
    /// User accounts table.
    ///
    /// Stores registered users with their unique email, display name, Argon2
    /// password hash, and role flag. The `id` column is the primary key
    /// (UUID v4); `email` carries a unique index.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique, lowercased account email (max 255 characters).
        email -> Varchar,
        /// Human-readable display name (max 50 characters).
        display_name -> Varchar,
        /// PHC-format Argon2id password hash.
        password_hash -> Varchar,
        /// Administrator role flag.
        admin -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}
