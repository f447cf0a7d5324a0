use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, ResultExt, DUPLICATE_CLIENT};
use crate::models::{Client, ClientRow};

const CLIENT_COLUMNS: &str = "id, first_name, second_name, last_name, passport, birth_date, \
     gender, salary, credit_amount, duration_in_months, status, monthly_payment";

/// Persistence for applicant records, keyed by generated id.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Inserts the record or replaces the one with the same id.
    async fn save(&self, client: &Client) -> Result<Client, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError>;

    /// Exact-match lookup on the natural key.
    async fn find_duplicate(
        &self,
        first_name: &str,
        second_name: &str,
        last_name: &str,
        passport: &str,
    ) -> Result<Option<Client>, AppError>;
}

/// Postgres-backed store over the `clients` table.
#[derive(Clone)]
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn save(&self, client: &Client) -> Result<Client, AppError> {
        let sql = format!(
            "INSERT INTO clients ({cols})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                second_name = EXCLUDED.second_name,
                last_name = EXCLUDED.last_name,
                passport = EXCLUDED.passport,
                birth_date = EXCLUDED.birth_date,
                gender = EXCLUDED.gender,
                salary = EXCLUDED.salary,
                credit_amount = EXCLUDED.credit_amount,
                duration_in_months = EXCLUDED.duration_in_months,
                status = EXCLUDED.status,
                monthly_payment = EXCLUDED.monthly_payment
             RETURNING {cols}",
            cols = CLIENT_COLUMNS
        );

        let result = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(client.id)
            .bind(&client.first_name)
            .bind(&client.second_name)
            .bind(&client.last_name)
            .bind(&client.passport)
            .bind(client.birth_date)
            .bind(client.gender.map(|g| g.as_str()))
            .bind(client.salary)
            .bind(client.credit_amount)
            .bind(client.duration_in_months)
            .bind(client.status.as_str())
            .bind(client.monthly_payment)
            .fetch_one(&self.pool)
            .await;

        let row = match result {
            Ok(row) => row,
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                tracing::warn!("Natural key collision while saving client {}", client.id);
                return Err(AppError::Conflict(DUPLICATE_CLIENT.to_string()));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to save client {}", client.id))
            }
        };

        Client::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let sql = format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS);
        let row = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load client by id")?;

        row.map(Client::try_from).transpose()
    }

    async fn find_duplicate(
        &self,
        first_name: &str,
        second_name: &str,
        last_name: &str,
        passport: &str,
    ) -> Result<Option<Client>, AppError> {
        let sql = format!(
            "SELECT {} FROM clients
             WHERE first_name = $1 AND second_name = $2 AND last_name = $3 AND passport = $4
             LIMIT 1",
            CLIENT_COLUMNS
        );
        let row = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(first_name)
            .bind(second_name)
            .bind(last_name)
            .bind(passport)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up duplicate client")?;

        row.map(Client::try_from).transpose()
    }
}

/// Process-local store. Enforces the same natural-key uniqueness as the
/// Postgres index.
#[derive(Default)]
pub struct InMemoryClientStore {
    records: RwLock<HashMap<Uuid, Client>>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::InternalError("client store lock poisoned".to_string())
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn save(&self, client: &Client) -> Result<Client, AppError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let taken = records.values().any(|existing| {
            existing.id != client.id
                && existing.has_natural_key(
                    &client.first_name,
                    &client.second_name,
                    &client.last_name,
                    &client.passport,
                )
        });
        if taken {
            return Err(AppError::Conflict(DUPLICATE_CLIENT.to_string()));
        }
        records.insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(&id).cloned())
    }

    async fn find_duplicate(
        &self,
        first_name: &str,
        second_name: &str,
        last_name: &str,
        passport: &str,
    ) -> Result<Option<Client>, AppError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .values()
            .find(|c| c.has_natural_key(first_name, second_name, last_name, passport))
            .cloned())
    }
}
