use bigdecimal::BigDecimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::calculator_client::CalculatorClient;
use crate::db_storage::ClientStore;
use crate::errors::{AppError, DUPLICATE_CLIENT};
use crate::models::{ApplicationSubmission, Client};
use crate::validation::validate;

/// Approval rule: salary must be strictly greater than twice the monthly
/// payment, compared in decimal arithmetic.
pub fn approves(salary: f64, monthly_payment: f64) -> bool {
    let salary = BigDecimal::from_str(&salary.to_string()).ok();
    let payment = BigDecimal::from_str(&monthly_payment.to_string()).ok();

    match (salary, payment) {
        (Some(salary), Some(payment)) => salary > payment * BigDecimal::from(2),
        _ => false,
    }
}

/// Orchestrates a mortgage application: duplicate check, calculator call,
/// approval decision, persistence.
#[derive(Clone)]
pub struct MortgageApplicationService {
    store: Arc<dyn ClientStore>,
    calculator: CalculatorClient,
}

impl MortgageApplicationService {
    pub fn new(store: Arc<dyn ClientStore>, calculator: CalculatorClient) -> Self {
        Self { store, calculator }
    }

    /// Validates and decides an application, returning the persisted record.
    ///
    /// A failed calculator call does not fail the submission: the application
    /// is denied instead.
    pub async fn submit(&self, submission: ApplicationSubmission) -> Result<Client, AppError> {
        let application = validate(submission)?;

        tracing::info!(
            "Mortgage application received for {} {} {}",
            application.first_name,
            application.second_name,
            application.last_name
        );

        let duplicate = self
            .store
            .find_duplicate(
                &application.first_name,
                &application.second_name,
                &application.last_name,
                &application.passport,
            )
            .await?;
        if let Some(existing) = duplicate {
            tracing::warn!("Duplicate application rejected, existing id {}", existing.id);
            return Err(AppError::Conflict(DUPLICATE_CLIENT.to_string()));
        }

        let mut client = Client::from_application(application);

        match self
            .calculator
            .calculate(client.credit_amount, client.duration_in_months)
            .await
        {
            Ok(monthly_payment) if approves(client.salary, monthly_payment) => {
                client.approve(monthly_payment);
            }
            Ok(monthly_payment) => {
                tracing::info!(
                    "Salary {} does not cover twice the monthly payment {}",
                    client.salary,
                    monthly_payment
                );
                client.deny();
            }
            Err(e) => {
                tracing::warn!("Calculator unavailable, denying application: {}", e);
                client.deny();
            }
        }

        let saved = self.store.save(&client).await?;
        tracing::info!("Application {} stored with status {}", saved.id, saved.status);

        Ok(saved)
    }

    pub async fn lookup(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        self.store.find_by_id(id).await
    }
}
