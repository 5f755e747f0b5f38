// src/common/validation.rs

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

/// Casas decimais das colunas de dinheiro (`NUMERIC(12, 2)`).
pub const MONEY_SCALE: u32 = 2;
/// Maior valor em centavos que cabe em `NUMERIC(12, 2)`.
const MAX_AMOUNT_CENTS: i64 = 999_999_999_999;

/// 9999999999.99
pub fn max_money() -> Decimal {
    Decimal::new(MAX_AMOUNT_CENTS, MONEY_SCALE)
}

/// Cabe na coluna: no máximo 9999999999.99 e duas casas decimais.
pub fn max_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value > max_money() {
        return Err(ValidationError::new("max_amount").with_message("must not exceed 9999999999.99".into()));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::new("scale").with_message("must have at most two decimal places".into()));
    }
    Ok(())
}

pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive").with_message("must be greater than zero".into()));
    }
    max_amount(value)
}

pub fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    max_amount(value)
}

/// Erro de nível de struct para campos que dependem de outros.
pub fn cross_field(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Um único erro de campo, para regras checadas fora do `Validate`.
pub fn field_error(field: &'static str, code: &'static str, message: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(message.into()));
    errors
}
