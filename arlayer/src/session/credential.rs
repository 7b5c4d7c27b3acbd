//! License credential validation.

use std::fmt;

use super::error::SessionError;

/// An accepted engine license credential.
///
/// Opaque to the bridge: it is validated for shape once and then only
/// handed to the engine. `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseCredential(String);

impl LicenseCredential {
    /// Validate a raw credential against the minimum length policy.
    ///
    /// Length is measured in characters.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCredential`] if the credential is empty
    /// or shorter than `min_length`.
    pub fn parse(raw: &str, min_length: usize) -> Result<Self, SessionError> {
        if raw.is_empty() {
            return Err(SessionError::InvalidCredential(
                "credential is required".to_string(),
            ));
        }

        let length = raw.chars().count();
        if length < min_length {
            return Err(SessionError::InvalidCredential(format!(
                "credential too short ({} characters, minimum {})",
                length, min_length
            )));
        }

        Ok(Self(raw.to_string()))
    }

    /// The raw credential, for handing to the engine.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false for a parsed credential.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for LicenseCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LicenseCredential(<{} chars redacted>)", self.len())
    }
}

impl fmt::Display for LicenseCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
