// Service error taxonomy, mapped to HTTP status codes at the
// presentation boundary
use thiserror::Error;

use crate::domain::layout::LayoutError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or out-of-range input. Never retried, surfaced as 400.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist. Surfaced as 404.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A backend or integration failure. Surfaced as a generic 500; the
    /// underlying detail is logged server-side only.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

impl From<LayoutError> for ServiceError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::UnknownWidget(_) => ServiceError::NotFound("widget"),
            LayoutError::DuplicateId(_) | LayoutError::InvalidSize { .. } => {
                ServiceError::Validation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_errors_map_to_taxonomy() {
        assert!(matches!(
            ServiceError::from(LayoutError::UnknownWidget("w".into())),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(LayoutError::InvalidSize { w: 13, h: 1 }),
            ServiceError::Validation(_)
        ));
    }
}
