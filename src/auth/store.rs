use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::TokenCredential;

/// Storage abstraction for persisted credentials, one per profile.
pub trait TokenStore: Send + Sync {
    fn load(&self, profile: &str) -> Result<Option<TokenCredential>, AuthError>;
    fn save(&self, profile: &str, credential: &TokenCredential) -> Result<(), AuthError>;
    fn clear(&self, profile: &str) -> Result<(), AuthError>;
}

/// File-backed token store writing one TOML file per profile.
///
/// # Example
/// ```no_run
/// use tado_client::auth::{FileTokenStore, TokenCredential, TokenStore};
///
/// let store = FileTokenStore::new_default();
/// store.save("default", &TokenCredential::from_refresh_token("refresh"))?;
/// # Ok::<(), tado_client::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn new_default() -> Self {
        Self::new(default_tado_dir())
    }

    fn token_path(&self, profile: &str) -> PathBuf {
        let profile = normalize_label(profile);
        let name = if profile == "default" {
            "token.toml".to_string()
        } else {
            format!("token.{profile}.toml")
        };
        self.base_dir.join(name)
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, profile: &str) -> Result<Option<TokenCredential>, AuthError> {
        let path = self.token_path(profile);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: TokenFile = toml::from_str(&raw)?;
        Ok(Some(file.credential))
    }

    fn save(&self, profile: &str, credential: &TokenCredential) -> Result<(), AuthError> {
        let path = self.token_path(profile);
        Self::ensure_parent(&path)?;
        let file = TokenFile {
            version: 1,
            profile: profile.to_string(),
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self, profile: &str) -> Result<(), AuthError> {
        let path = self.token_path(profile);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    version: u32,
    profile: String,
    saved_at: DateTime<Utc>,
    credential: TokenCredential,
}

fn default_tado_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".tado"))
        .unwrap_or_else(|| PathBuf::from(".tado"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileTokenStore) {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        (dir, store)
    }

    fn credential() -> TokenCredential {
        TokenCredential {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() + Duration::minutes(10),
            scope: Some("offline_access".to_string()),
            token_type: None,
        }
    }

    #[test]
    fn saved_credential_loads_back() {
        let (_dir, store) = temp_store();
        let saved = credential();
        store.save("default", &saved).unwrap();
        let loaded = store.load("default").unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(loaded.expires_at.timestamp(), saved.expires_at.timestamp());
    }

    #[test]
    fn profiles_are_kept_apart() {
        let (dir, store) = temp_store();
        store.save("Holiday Home", &credential()).unwrap();
        assert!(store.load("default").unwrap().is_none());
        assert!(store.load("Holiday Home").unwrap().is_some());
        assert!(dir.path().join("token.holiday-home.toml").exists());
    }

    #[test]
    fn clear_removes_credential_and_tolerates_missing_file() {
        let (_dir, store) = temp_store();
        store.save("default", &credential()).unwrap();
        store.clear("default").unwrap();
        assert!(store.load("default").unwrap().is_none());
        store.clear("default").unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, store) = temp_store();
        store.save("default", &credential()).unwrap();
        let mode = fs::metadata(dir.path().join("token.toml"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
