//! Persisted credentials and the role gate in front of each view.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{AndiamoError, AndiamoResult};
use crate::user::{LoginResponse, Role};

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";
pub const USER_ID_KEY: &str = "userId";
pub const EMAIL_KEY: &str = "email";
pub const IMAGE_KEY: &str = "image";

const SESSION_KEYS: [&str; 5] = [TOKEN_KEY, ROLE_KEY, USER_ID_KEY, EMAIL_KEY, IMAGE_KEY];

/// String key/value store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> AndiamoResult<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    AndiamoError::Store(format!("Could not parse {}: {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(CredentialStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_many(&mut self, pairs: &[(&str, String)]) -> AndiamoResult<()> {
        for (key, value) in pairs {
            self.entries.insert((*key).to_string(), value.clone());
        }
        self.save()
    }

    pub fn remove_many(&mut self, keys: &[&str]) -> AndiamoResult<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        self.save()
    }

    /// Write to a sibling temp file, then rename over the store.
    fn save(&self) -> AndiamoResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| AndiamoError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;

        // Owner-only (0600), the file holds the bearer token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!("Saved credential store to {}", self.path.display());
        Ok(())
    }
}

/// Record a successful login.
pub fn store_login(store: &mut CredentialStore, login: &LoginResponse) -> AndiamoResult<()> {
    store.set_many(&[
        (TOKEN_KEY, login.token.clone()),
        (ROLE_KEY, login.user.role.to_string()),
        (USER_ID_KEY, login.user.id.to_string()),
        (EMAIL_KEY, login.user.email.clone()),
        (IMAGE_KEY, login.user.image.clone().unwrap_or_default()),
    ])
}

/// Forget the logged-in account.
pub fn clear_session(store: &mut CredentialStore) -> AndiamoResult<()> {
    store.remove_many(&SESSION_KEYS)
}

/// Profile fields kept with the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub image: Option<String>,
}

impl Profile {
    pub fn from_store(store: &CredentialStore) -> Self {
        let non_empty = |key: &str| store.get(key).filter(|v| !v.is_empty()).map(str::to_string);

        Profile {
            user_id: store.get(USER_ID_KEY).and_then(|v| v.parse().ok()),
            email: non_empty(EMAIL_KEY),
            role: store.get(ROLE_KEY).and_then(|v| v.parse().ok()),
            image: non_empty(IMAGE_KEY),
        }
    }
}

/// Outcome of checking the stored session against a view's required role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted { token: String },
    Unauthenticated,
    Forbidden,
}

/// Admits only sessions holding a token and the expected role.
#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    expected: Role,
}

impl AccessGate {
    pub fn new(expected: Role) -> Self {
        AccessGate { expected }
    }

    pub fn check(&self, store: &CredentialStore) -> Access {
        let Some(token) = store.get(TOKEN_KEY).filter(|t| !t.is_empty()) else {
            return Access::Unauthenticated;
        };

        if store.get(ROLE_KEY) != Some(self.expected.as_str()) {
            return Access::Forbidden;
        }

        Access::Granted {
            token: token.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::User;

    fn login(role: Role) -> LoginResponse {
        LoginResponse {
            token: "tok-123".to_string(),
            user: User {
                id: 42,
                name: Some("Sam".to_string()),
                email: "sam@example.com".to_string(),
                role,
                image: None,
                created_at: None,
            },
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("session.json")).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
        assert_eq!(AccessGate::new(Role::User).check(&store), Access::Unauthenticated);
    }

    #[test]
    fn test_login_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.json");

        let mut store = CredentialStore::open(&path).unwrap();
        store_login(&mut store, &login(Role::User)).unwrap();

        let reopened = CredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY), Some("tok-123"));
        assert_eq!(reopened.get(ROLE_KEY), Some("USER"));
        assert_eq!(reopened.get(USER_ID_KEY), Some("42"));
        assert_eq!(reopened.get(IMAGE_KEY), Some(""));

        let profile = Profile::from_store(&reopened);
        assert_eq!(profile.user_id, Some(42));
        assert_eq!(profile.role, Some(Role::User));
        assert_eq!(profile.email.as_deref(), Some("sam@example.com"));
        assert!(profile.image.is_none());
    }

    #[test]
    fn test_gate_checks_role() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::open(dir.path().join("session.json")).unwrap();
        store_login(&mut store, &login(Role::Admin)).unwrap();

        assert_eq!(AccessGate::new(Role::User).check(&store), Access::Forbidden);
        assert_eq!(
            AccessGate::new(Role::Admin).check(&store),
            Access::Granted {
                token: "tok-123".to_string()
            }
        );
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::open(dir.path().join("session.json")).unwrap();
        store
            .set_many(&[(TOKEN_KEY, String::new()), (ROLE_KEY, "USER".to_string())])
            .unwrap();

        assert_eq!(AccessGate::new(Role::User).check(&store), Access::Unauthenticated);
    }

    #[test]
    fn test_clear_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = CredentialStore::open(&path).unwrap();
        store_login(&mut store, &login(Role::User)).unwrap();
        store.set_many(&[("theme", "dark".to_string())]).unwrap();

        clear_session(&mut store).unwrap();

        let reopened = CredentialStore::open(&path).unwrap();
        assert!(reopened.get(TOKEN_KEY).is_none());
        assert!(reopened.get(ROLE_KEY).is_none());
        assert_eq!(reopened.get("theme"), Some("dark"));
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = CredentialStore::open(&path).unwrap();
        store.set_many(&[(TOKEN_KEY, "secret".to_string())]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = CredentialStore::open(&path).unwrap_err();
        assert!(matches!(err, AndiamoError::Store(_)));
    }
}
