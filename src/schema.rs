//! Database schema management for `aquafield`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `users` table for accounts and the `water_usage` table for
/// logged irrigation events. Safe to call on every startup; no-op if objects
/// already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Accounts: farmers and admins share one table, split by role
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            UUID PRIMARY KEY,
            name          TEXT        NOT NULL,
            email         TEXT        NOT NULL UNIQUE,
            password_hash TEXT        NOT NULL,
            phone         TEXT        NOT NULL,
            location      TEXT        NOT NULL,
            role          TEXT        NOT NULL DEFAULT 'farmer',
            state         TEXT,
            district      TEXT,
            farm_size     DOUBLE PRECISION,
            is_active     BOOLEAN     NOT NULL DEFAULT TRUE,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Logged irrigation events served by `/api/water-usage`
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS water_usage (
            id                UUID PRIMARY KEY,
            farmer_id         UUID        NOT NULL REFERENCES users (id),
            source            TEXT        NOT NULL,
            usage_amount      DOUBLE PRECISION NOT NULL,
            date              TIMESTAMPTZ NOT NULL,
            crop_type         TEXT        NOT NULL,
            area_irrigated    DOUBLE PRECISION NOT NULL,
            notes             TEXT,
            weather_condition TEXT,
            efficiency        DOUBLE PRECISION NOT NULL,
            created_at        TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Indexes matching the common listing queries (per farmer, newest first)
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_water_usage_farmer_date
            ON water_usage (farmer_id, date DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_water_usage_farmer_created_at
            ON water_usage (farmer_id, created_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
