// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::common::error::AppError;

// Usado no `#[validate(custom(...))]` dos payloads
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusive_min".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

/// Texto obrigatório, já sem espaços nas pontas.
pub fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("o campo '{field}' é obrigatório")));
    }
    Ok(trimmed.to_string())
}

/// Texto opcional: vazio vira `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_validators() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn text_helpers_trim_input() {
        assert_eq!(required_text("  falta de pagamento ", "reason").unwrap(), "falta de pagamento");
        assert!(matches!(required_text("   ", "reason"), Err(AppError::Validation(_))));
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" ref-1 ")), Some("ref-1".to_string()));
    }
}
