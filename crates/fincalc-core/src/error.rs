use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FincalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Lump sum {lump_sum} exceeds the outstanding balance {outstanding}")]
    Overpayment {
        lump_sum: Decimal,
        outstanding: Decimal,
    },

    #[error("Installment {installment} does not cover the interest accruing per period ({interest_due}); the loan never amortises")]
    NonAmortising {
        installment: Decimal,
        interest_due: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FincalcError {
    fn from(e: serde_json::Error) -> Self {
        FincalcError::SerializationError(e.to_string())
    }
}
