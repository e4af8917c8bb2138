use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComposerError>;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Chooser engine is closed")]
    EngineClosed,
}

impl ComposerError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            ComposerError::invalid_config("service_timeout_ms must be > 0").to_string(),
            "Invalid configuration: service_timeout_ms must be > 0"
        );
        assert_eq!(ComposerError::EngineClosed.to_string(), "Chooser engine is closed");
    }
}
