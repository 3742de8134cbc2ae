//! Error types
//!
//! Everything that can fail in this crate fails at construction time:
//! loading a scene configuration, generating a population, or setting up
//! the WebGL pipeline. The per-frame update path is total and never errors.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised while building a scene.
#[derive(Error, Debug)]
pub enum TreeError {
    /// A population was asked to hold zero elements.
    #[error("population '{0}' must contain at least one element")]
    EmptyPopulation(&'static str),

    /// A palette list was empty.
    #[error("palette for '{0}' is empty")]
    EmptyPalette(&'static str),

    /// A palette entry was not a `#rrggbb` hex string.
    #[error("invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),

    /// Cone or scatter parameters that cannot produce a silhouette.
    #[error("invalid shape for '{population}': {reason}")]
    InvalidShape {
        population: &'static str,
        reason: String,
    },

    /// A scalar parameter outside its allowed range.
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    /// The YAML scene configuration could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// WebGL setup failed (shader compile, link, buffer or framebuffer).
    #[error("render error: {0}")]
    Render(String),
}

impl TreeError {
    pub(crate) fn render(msg: impl Into<String>) -> Self {
        TreeError::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TreeError::EmptyPopulation("foliage");
        assert_eq!(err.to_string(), "population 'foliage' must contain at least one element");

        let err = TreeError::InvalidColor("#12".to_string());
        assert!(err.to_string().contains("#12"));

        let err = TreeError::InvalidParameter {
            name: "spread",
            value: 1.5,
            reason: "must be in [0, 1)",
        };
        assert!(err.to_string().contains("spread"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_yaml_error_converts() {
        let parsed: std::result::Result<u32, _> = serde_yaml::from_str("not: [a number");
        let err: TreeError = parsed.unwrap_err().into();
        assert!(matches!(err, TreeError::Config(_)));
    }
}
