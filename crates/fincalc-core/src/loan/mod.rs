pub mod amortisation;
pub mod prepayment;
pub mod schedule;
