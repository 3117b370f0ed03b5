//! Redaction wrapper for secret values.
//!
//! Web-API tokens travel through configuration and warning paths that get
//! logged; `Sensitive<T>` ensures they never appear in Debug or Display
//! output.

use std::fmt;

/// Wraps a secret so that formatting it never reveals the value.
///
/// # Example
///
/// ```
/// use metricat_core_types::Sensitive;
///
/// let token = Sensitive::new("P5c91jhalnkj13-token");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(token.expose(), &"P5c91jhalnkj13-token");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a secret value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Access the underlying secret.
    ///
    /// Call sites should be limited to the point where the secret is
    /// actually sent (request headers).
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the secret.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redact() {
        let key = Sensitive::new(String::from("secret-api-key"));
        assert_eq!(format!("{:?}", key), "***REDACTED***");
        assert_eq!(format!("{}", key), "***REDACTED***");
    }

    #[test]
    fn test_expose_returns_value() {
        let key = Sensitive::new(42u32);
        assert_eq!(key.expose(), &42);
    }

    #[test]
    fn test_into_inner_unwraps() {
        let key = Sensitive::new(String::from("tok"));
        assert_eq!(key.into_inner(), "tok");
    }

    #[test]
    fn test_redaction_inside_containing_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct KeyEntry {
            tenant: String,
            token: Sensitive<String>,
        }

        let entry = KeyEntry {
            tenant: "TEST".to_string(),
            token: Sensitive::new("hidden".to_string()),
        };
        let rendered = format!("{:?}", entry);
        assert!(rendered.contains("TEST"));
        assert!(rendered.contains("***REDACTED***"));
        assert!(!rendered.contains("hidden"));
    }
}
