use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

/// Input rejected before any computation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("{field} {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl CalcError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { field, .. } => field,
        }
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid(field, "must be > 0"));
    }
    Ok(value)
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid(field, "must be >= 0"));
    }
    Ok(value)
}

pub(crate) fn optional_positive(
    field: &'static str,
    value: Option<f64>,
) -> CalcResult<Option<f64>> {
    value.map(|v| require_positive(field, v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = CalcError::invalid("principal", "must be > 0");
        assert_eq!(err.to_string(), "principal must be > 0");
        assert_eq!(err.field(), "principal");
    }

    #[test]
    fn positive_rejects_zero_negative_and_non_finite() {
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", -1.0).is_err());
        assert!(require_positive("x", f64::NAN).is_err());
        assert!(require_positive("x", f64::INFINITY).is_err());
        assert_eq!(require_positive("x", 2.5), Ok(2.5));
    }

    #[test]
    fn optional_positive_passes_none_through() {
        assert_eq!(optional_positive("x", None), Ok(None));
        assert!(optional_positive("x", Some(0.0)).is_err());
    }
}
