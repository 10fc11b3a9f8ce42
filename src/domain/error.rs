use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("`{value}` is not a valid song identifier")]
    InvalidIdentifier { value: String },
    #[error("field `{field}` must not be empty")]
    EmptyField { field: &'static str },
}

impl DomainError {
    pub fn invalid_identifier(value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.into(),
        }
    }

    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }
}
