use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

// ============ Domain Models ============

/// Applicant gender as accepted on the wire and stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Lifecycle status of a mortgage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    Processing,
    Approved,
    Denied,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Processing => "PROCESSING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Denied => "DENIED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(ApplicationStatus::Processing),
            "APPROVED" => Ok(ApplicationStatus::Approved),
            "DENIED" => Ok(ApplicationStatus::Denied),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}

/// A persisted mortgage application (the applicant record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub passport: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub salary: f64,
    pub credit_amount: f64,
    pub duration_in_months: i32,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<f64>,
}

impl Client {
    /// Creates a fresh record with a generated id and PROCESSING status.
    pub fn from_application(application: NewApplication) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: application.first_name,
            second_name: application.second_name,
            last_name: application.last_name,
            passport: application.passport,
            birth_date: application.birth_date,
            gender: application.gender,
            salary: application.salary,
            credit_amount: application.credit_amount,
            duration_in_months: application.duration_in_months,
            status: ApplicationStatus::Processing,
            monthly_payment: None,
        }
    }

    pub fn approve(&mut self, monthly_payment: f64) {
        self.status = ApplicationStatus::Approved;
        self.monthly_payment = Some(monthly_payment);
    }

    pub fn deny(&mut self) {
        self.status = ApplicationStatus::Denied;
        self.monthly_payment = None;
    }

    /// Representation returned to the submitter right after creation: the
    /// decision is never exposed here, only through a later lookup.
    pub fn submitted_view(&self) -> Self {
        Self {
            status: ApplicationStatus::Processing,
            monthly_payment: None,
            ..self.clone()
        }
    }

    pub fn has_natural_key(
        &self,
        first_name: &str,
        second_name: &str,
        last_name: &str,
        passport: &str,
    ) -> bool {
        self.first_name == first_name
            && self.second_name == second_name
            && self.last_name == last_name
            && self.passport == passport
    }
}

/// Row layout of the `clients` table. Enumerations are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub passport: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub salary: f64,
    pub credit_amount: f64,
    pub duration_in_months: i32,
    pub status: String,
    pub monthly_payment: Option<f64>,
}

impl TryFrom<ClientRow> for Client {
    type Error = AppError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .as_deref()
            .map(Gender::from_str)
            .transpose()
            .map_err(AppError::InternalError)?;
        let status = ApplicationStatus::from_str(&row.status).map_err(AppError::InternalError)?;

        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            second_name: row.second_name,
            last_name: row.last_name,
            passport: row.passport,
            birth_date: row.birth_date,
            gender,
            salary: row.salary,
            credit_amount: row.credit_amount,
            duration_in_months: row.duration_in_months,
            status,
            monthly_payment: row.monthly_payment,
        })
    }
}

// ============ API Models ============

/// Raw submission body. Every field is optional here so that missing values
/// surface as field-level validation errors instead of body rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub last_name: Option<String>,
    pub passport: Option<String>,
    /// Kept as raw JSON so any non-string value reports the date hint.
    pub birth_date: Option<serde_json::Value>,
    /// Kept as raw JSON so any non-string value reports the gender hint.
    pub gender: Option<serde_json::Value>,
    pub salary: Option<f64>,
    pub credit_amount: Option<f64>,
    pub duration_in_months: Option<i32>,
}

/// Submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub passport: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub salary: f64,
    pub credit_amount: f64,
    pub duration_in_months: i32,
}

// ============ Calculator Models ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub credit_amount: f64,
    pub duration_in_months: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub credit_amount: Option<f64>,
    pub duration_in_months: Option<i32>,
    pub monthly_payment: Option<f64>,
}
