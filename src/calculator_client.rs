use crate::errors::AppError;
use crate::models::{CalculateRequest, CalculateResponse};

/// Client for the external mortgage calculator service.
///
/// The underlying `reqwest::Client` keeps its default settings; calls are not
/// retried and carry no timeout of their own.
#[derive(Clone)]
pub struct CalculatorClient {
    client: reqwest::Client,
    base_url: String,
}

impl CalculatorClient {
    /// Creates a new `CalculatorClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the calculator; `/calculate` is appended.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create calculator client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/calculate", self.base_url)
    }

    /// Computes the monthly payment for a loan.
    ///
    /// # Arguments
    ///
    /// * `credit_amount` - Principal amount.
    /// * `duration_in_months` - Loan term.
    ///
    /// # Returns
    ///
    /// * `Result<f64, AppError>` - The monthly payment, or `ExternalApiError` when
    ///   the call fails, the status is not 2xx, or the body has no usable payment.
    pub async fn calculate(
        &self,
        credit_amount: f64,
        duration_in_months: i32,
    ) -> Result<f64, AppError> {
        let url = self.endpoint();
        tracing::info!(
            "Requesting monthly payment: amount={}, months={}",
            credit_amount,
            duration_in_months
        );

        let body = CalculateRequest {
            credit_amount,
            duration_in_months,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Calculator request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Calculator returned {}: {}",
                status, error_text
            )));
        }

        let data: CalculateResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse calculator response: {}", e))
        })?;

        match data.monthly_payment {
            Some(payment) if payment.is_finite() => {
                tracing::debug!("Calculator returned monthly payment {}", payment);
                Ok(payment)
            }
            _ => Err(AppError::ExternalApiError(
                "Calculator response missing 'monthlyPayment'".to_string(),
            )),
        }
    }
}
