use thiserror::Error;

/// Error type with stable exit codes
#[derive(Debug, Error)]
pub enum BrandprobeError {
    /// Unusable input (exit code 2)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Page could not be loaded: timeout or unreachable host (exit code 3)
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// WebDriver connection failed (exit code 4)
    #[error("WebDriver connection failed: {0}")]
    WebDriverFailed(String),
    /// No render session could be opened (exit code 5)
    #[error("Render session unavailable: {0}")]
    SessionUnavailable(String),
    /// Operation timeout (exit code 6)
    #[error("Operation timed out: {0}")]
    Timeout(String),
    /// Generic error (exit code 1)
    #[error(transparent)]
    Other(anyhow::Error),
}

impl BrandprobeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BrandprobeError::Other(_) => 1,
            BrandprobeError::InvalidInput(_) => 2,
            BrandprobeError::Navigation(_) => 3,
            BrandprobeError::WebDriverFailed(_) => 4,
            BrandprobeError::SessionUnavailable(_) => 5,
            BrandprobeError::Timeout(_) => 6,
        }
    }
}

impl From<anyhow::Error> for BrandprobeError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<BrandprobeError>() {
            Ok(typed) => return typed,
            Err(err) => err,
        };

        // Fall back to the message for errors raised by dependencies
        let msg = format!("{:#}", err);

        if msg.contains("Failed to connect to WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            BrandprobeError::WebDriverFailed(msg)
        } else if msg.contains("timeout") || msg.contains("timed out") {
            BrandprobeError::Timeout(msg)
        } else {
            BrandprobeError::Other(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            BrandprobeError::Other(anyhow::anyhow!("x")),
            BrandprobeError::InvalidInput("x".into()),
            BrandprobeError::Navigation("x".into()),
            BrandprobeError::WebDriverFailed("x".into()),
            BrandprobeError::SessionUnavailable("x".into()),
            BrandprobeError::Timeout("x".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_typed_error_survives_anyhow_round_trip() {
        let err: anyhow::Error = BrandprobeError::Navigation("dns error".into()).into();
        let back = BrandprobeError::from(err);
        assert!(matches!(back, BrandprobeError::Navigation(ref m) if m == "dns error"));
        assert_eq!(back.exit_code(), 3);
    }

    #[test]
    fn test_message_classification() {
        let err = BrandprobeError::from(anyhow::anyhow!("chromedriver not found in PATH"));
        assert!(matches!(err, BrandprobeError::WebDriverFailed(_)));

        let err = BrandprobeError::from(anyhow::anyhow!("script timed out"));
        assert!(matches!(err, BrandprobeError::Timeout(_)));

        let err = BrandprobeError::from(anyhow::anyhow!("something else"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "something else");
    }
}
