use std::fmt;

use crate::error::CoreError;

const MAX_PATH_LEN: usize = 512;

/// A rendered page path whose cached output goes stale after a write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPath(String);

impl RenderPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RenderPath {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidPath("empty path".to_string()));
        }
        if trimmed.len() > MAX_PATH_LEN || !trimmed.starts_with('/') {
            return Err(CoreError::InvalidPath(trimmed.to_string()));
        }
        if trimmed.chars().any(|ch| ch.is_whitespace()) {
            return Err(CoreError::InvalidPath(trimmed.to_string()));
        }
        Ok(RenderPath(trimmed.to_string()))
    }
}

impl fmt::Display for RenderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::RenderPath;

    #[test]
    fn accepts_basic_path() {
        let path = RenderPath::try_from(" /thread/abc ").unwrap();
        assert_eq!(path.as_str(), "/thread/abc");
    }

    #[test]
    fn rejects_relative_or_spaced_path() {
        assert!(RenderPath::try_from("").is_err());
        assert!(RenderPath::try_from("thread/abc").is_err());
        assert!(RenderPath::try_from("/thread/a b").is_err());
        assert!(RenderPath::try_from(format!("/{}", "a".repeat(600)).as_str()).is_err());
    }
}
