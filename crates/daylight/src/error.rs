//! Controller error type.

use crate::store::StoreError;

/// Error returned by controller operations that write the preference.
///
/// Reads never fail; only persisting a new preference can.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("could not save theme preference: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_store_error_display() {
        let err = ThemeError::from(StoreError::Io {
            path: PathBuf::from("/tmp/state.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        let msg = err.to_string();
        assert!(msg.contains("theme preference"));
        assert!(msg.contains("state.json"));
    }
}
