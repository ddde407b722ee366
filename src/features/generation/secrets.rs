//! API key resolution: key file first, then environment.

use log::{debug, info};
use std::path::PathBuf;

use super::error::GenerationError;

pub const DEFAULT_KEY_FILE: &str = "GOOGLE_API_KEY.txt";
pub const DEFAULT_KEY_ENV: &str = "GOOGLE_API_KEY";

#[derive(Debug, Clone)]
pub struct ApiKeySource {
    pub file: PathBuf,
    pub env_var: String,
}

impl Default for ApiKeySource {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_KEY_FILE),
            env_var: DEFAULT_KEY_ENV.to_string(),
        }
    }
}

impl ApiKeySource {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Resolve the key. Only the first line of the key file is used.
    pub fn resolve(&self) -> Result<String, GenerationError> {
        match std::fs::read_to_string(&self.file) {
            Ok(contents) => {
                let key = contents.lines().next().unwrap_or("").trim();
                if !key.is_empty() {
                    info!("Using API key from {}", self.file.display());
                    return Ok(key.to_string());
                }
                debug!("Key file {} is empty", self.file.display());
            }
            Err(e) => debug!("Key file {} not readable: {e}", self.file.display()),
        }

        match std::env::var(&self.env_var) {
            Ok(key) if !key.trim().is_empty() => {
                info!("Using API key from ${}", self.env_var);
                Ok(key.trim().to_string())
            }
            _ => Err(GenerationError::configuration(format!(
                "No API key detected: {} is missing and ${} is not set",
                self.file.display(),
                self.env_var
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::generation::GenerationErrorKind;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("key-{}.txt", Uuid::new_v4()))
    }

    #[test]
    fn test_reads_first_line_of_key_file() {
        let path = temp_path();
        std::fs::write(&path, "abc123\nsecond line\n").unwrap();
        let source = ApiKeySource {
            file: path.clone(),
            env_var: format!("UNSET_{}", Uuid::new_v4().simple()),
        };

        assert_eq!(source.resolve().unwrap(), "abc123");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_and_env_is_configuration_error() {
        let source = ApiKeySource {
            file: temp_path(),
            env_var: format!("UNSET_{}", Uuid::new_v4().simple()),
        };

        let err = source.resolve().unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Configuration);
    }

    #[test]
    fn test_falls_back_to_environment() {
        let var = format!("KEY_TEST_{}", Uuid::new_v4().simple());
        std::env::set_var(&var, "from-env");
        let source = ApiKeySource {
            file: temp_path(),
            env_var: var.clone(),
        };

        assert_eq!(source.resolve().unwrap(), "from-env");
        std::env::remove_var(&var);
    }
}
