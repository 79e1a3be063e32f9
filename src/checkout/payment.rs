use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// 16 digits, either contiguous or as four groups of four.
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{16}|\d{4}(?: \d{4}){3})$").expect("card number regex is valid"));

/// `MM/YY` with a real month.
static EXPIRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0[1-9]|1[0-2])/\d{2}$").expect("expiry regex is valid"));

static CVV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3}$").expect("cvv regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    CardNumber,
    Expiry,
    Cvv,
}

impl PaymentField {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentField::CardNumber => "Card Number",
            PaymentField::Expiry => "Expiry Date",
            PaymentField::Cvv => "CVV",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            PaymentField::CardNumber => "Card number must be 16 digits, optionally grouped as 1234 5678 9123 4567",
            PaymentField::Expiry => "Expiry date must be MM/YY",
            PaymentField::Cvv => "CVV must be 3 digits",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: PaymentField,
    pub message: &'static str,
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid payment details: {}", summary(.errors))]
pub struct PaymentErrors {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors.iter().map(|e| e.message).collect::<Vec<_>>().join("; ")
}

impl PaymentErrors {
    pub fn has(&self, field: PaymentField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn message_for(&self, field: PaymentField) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

/// Card details as typed into the payment form. Format checks only; no
/// payment is processed.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl PaymentDetails {
    pub fn new(card_number: impl Into<String>, expiry: impl Into<String>, cvv: impl Into<String>) -> Self {
        Self {
            card_number: card_number.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PaymentErrors> {
        let checks = [
            (PaymentField::CardNumber, CARD_NUMBER.is_match(self.card_number.trim())),
            (PaymentField::Expiry, EXPIRY.is_match(self.expiry.trim())),
            (PaymentField::Cvv, CVV.is_match(self.cvv.trim())),
        ];
        let errors: Vec<FieldError> = checks
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(field, _)| FieldError {
                field,
                message: field.message(),
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PaymentErrors { errors })
        }
    }
}

// Card data stays out of logs.
impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_number", &"<redacted>")
            .field("expiry", &"<redacted>")
            .field("cvv", &"<redacted>")
            .finish()
    }
}
