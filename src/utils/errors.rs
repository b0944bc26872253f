use thiserror::Error;

use crate::constants::MAX_COMMENT_PATTERNS;

/// Main error type for marktree
#[derive(Error, Debug)]
pub enum MarktreeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    PatternError(#[from] PatternError),
}

/// Rejections produced when a marker list is edited
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Add at least one marker.")]
    Empty,

    #[error("Max {max} markers.")]
    TooMany { max: usize },
}

impl PatternError {
    pub fn too_many() -> Self {
        Self::TooMany {
            max: MAX_COMMENT_PATTERNS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_messages() {
        assert_eq!(PatternError::Empty.to_string(), "Add at least one marker.");
        assert_eq!(PatternError::too_many().to_string(), "Max 4 markers.");
    }

    #[test]
    fn test_pattern_error_is_transparent() {
        let err: MarktreeError = PatternError::Empty.into();
        assert_eq!(err.to_string(), "Add at least one marker.");
    }
}
