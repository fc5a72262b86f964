use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl LoanError {
    pub(crate) fn invalid_input(field: &str, reason: &str) -> Self {
        LoanError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<chrono::ParseError> for LoanError {
    fn from(e: chrono::ParseError) -> Self {
        LoanError::InvalidDate(e.to_string())
    }
}

pub type LoanResult<T> = Result<T, LoanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_log::test;

    #[test]
    fn test_display() {
        let err = LoanError::invalid_input("principal", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid input: principal - must be positive"
        );
    }

    #[test]
    fn test_from_parse_error() {
        let err: LoanError = NaiveDate::parse_from_str("2024-13-01", "%Y-%m-%d")
            .unwrap_err()
            .into();
        assert!(matches!(err, LoanError::InvalidDate(_)));
    }
}
