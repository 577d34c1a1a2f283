use crate::error::AppError;
use subtle::ConstantTimeEq;

/// Checks the shared application password.
#[derive(Clone)]
pub struct SecretKeyValidator {
    expected: String,
}

impl std::fmt::Debug for SecretKeyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKeyValidator")
            .field("expected", &"<redacted>")
            .finish()
    }
}

impl SecretKeyValidator {
    pub fn new(expected: String) -> Self {
        Self { expected }
    }

    /// Exact byte equality, compared in constant time.
    pub fn validate(&self, provided: &str) -> Result<(), AppError> {
        // Slices of different length compare unequal without a content scan.
        let matches: bool = self.expected.as_bytes().ct_eq(provided.as_bytes()).into();

        if !matches {
            tracing::warn!(
                event = "invalid_password_attempt",
                provided_length = provided.len(),
                "Invalid password attempt"
            );
            return Err(AppError::InvalidCredential);
        }

        tracing::debug!("Password validated");
        Ok(())
    }
}
