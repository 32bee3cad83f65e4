use std::fmt;

/// Marker written in place of credential values wherever they would be shown.
pub const REDACTED: &str = "[REDACTED]";

/// A wrapper type for credentials such as provider API keys
///
/// `Secret<T>` hides the inner value in debug output and display implementations
/// so that a `ProviderParam` can be logged or captured for diagnostics without
/// leaking the key. It deliberately does not implement `Serialize`; structs
/// holding a secret skip the field instead.
///
/// # Examples
///
/// ```
/// use inference_bridge_core::Secret;
///
/// let api_key = Secret::new("sk-ant-123".to_string());
/// assert_eq!(format!("{:?}", api_key), "[REDACTED]");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret<T>(T);

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("••••••")
    }
}

impl<T> Secret<T> {
    /// Creates a new Secret wrapper around a value
    pub fn new(value: T) -> Self {
        Secret(value)
    }

    /// Gets a reference to the inner value
    ///
    /// Only call this at the point where the credential is written into an
    /// outgoing request header.
    pub fn inner(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    /// True when no credential has been configured.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Secret(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug() {
        let secret = Secret::new("api-key-123");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
    }

    #[test]
    fn test_secret_display() {
        let secret = Secret::new("api-key-123");
        assert_eq!(format!("{}", secret), "••••••");
    }

    #[test]
    fn test_secret_inner_and_empty() {
        let secret: Secret<String> = "api-key-123".into();
        assert_eq!(secret.inner(), "api-key-123");
        assert!(!secret.is_empty());
        assert!(Secret::<String>::from("  ").is_empty());
    }
}
