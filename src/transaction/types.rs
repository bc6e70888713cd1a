//! Transaction Pipeline Types
//!
//! Payload, outcome status codes and the rendered response.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fund-transfer payload accepted on `/v1/transactions`
///
/// Only built from a document that already passed schema validation.
/// `reference` uniqueness is enforced by the datastore, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub service: String,
    pub name: String,
    pub amount: Decimal,
    pub account: String,
    pub reference: String,
}

impl fmt::Display for TransactionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{service: {}, name: {}, amount: {}, account: {}, reference: {}}}",
            self.service, self.name, self.amount, self.account, self.reference
        )
    }
}

/// Application-level outcome code, distinct from the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum OutcomeStatus {
    Success = 600,
    Failure = 601,
}

impl OutcomeStatus {
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub const SUCCESS_MESSAGE: &str = "Transaction processed successfully.";
pub const DUPLICATE_REFERENCE_MESSAGE: &str = "Duplicate reference received, try with another one.";

/// Status, message and HTTP code for one request; consumed once by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub message: String,
    pub http_status: u16,
}

impl Outcome {
    pub fn success() -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: SUCCESS_MESSAGE.to_string(),
            http_status: 200,
        }
    }

    /// Every failure reports HTTP 500, duplicates included
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            message: message.into(),
            http_status: 500,
        }
    }
}

/// Final body and HTTP code. Headers are applied by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub body: String,
    pub http_status: u16,
}
