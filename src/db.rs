use sqlx::{postgres::PgPoolOptions, PgPool};

const CREATE_CLIENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id                 UUID PRIMARY KEY,
    first_name         TEXT NOT NULL,
    second_name        TEXT NOT NULL,
    last_name          TEXT NOT NULL,
    passport           TEXT NOT NULL,
    birth_date         DATE,
    gender             TEXT,
    salary             DOUBLE PRECISION NOT NULL,
    credit_amount      DOUBLE PRECISION NOT NULL,
    duration_in_months INTEGER NOT NULL,
    status             TEXT NOT NULL,
    monthly_payment    DOUBLE PRECISION,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

// Natural key: two applications with the same names and passport never both persist.
const CREATE_NATURAL_KEY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS clients_natural_key_idx
    ON clients (first_name, second_name, last_name, passport)
"#;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates the `clients` table and its natural-key index when missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_CLIENTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_NATURAL_KEY_INDEX)
            .execute(&self.pool)
            .await?;
        tracing::info!("Schema for clients table verified");
        Ok(())
    }
}
