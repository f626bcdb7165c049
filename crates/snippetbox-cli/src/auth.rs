//! Keychain-backed session persistence for the CLI.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use snippetbox_core::auth::{
    AuthError, AuthResult, AuthSession, SessionPersistence, SupabaseAuthClient,
};
use snippetbox_core::config::ClientConfig;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "snippetbox-cli";
const SESSION_ACCOUNT: &str = "supabase_session";

#[derive(Clone)]
pub struct SessionStore {
    username: String,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::for_account(SESSION_ACCOUNT)
    }

    fn for_account(username: &str) -> Self {
        Self {
            username: username.to_string(),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> AuthResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionPersistence for SessionStore {
    #[cfg(not(test))]
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        guard
            .get(&self.username)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(AuthError::from)
    }

    #[cfg(not(test))]
    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&raw)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?
            .insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> AuthResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> AuthResult<()> {
        Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?
            .remove(&self.username);
        Ok(())
    }
}

pub type CliAuthClient = SupabaseAuthClient<SessionStore>;

pub fn auth_client(config: &ClientConfig) -> AuthResult<CliAuthClient> {
    SupabaseAuthClient::new(config, SessionStore::new())
}

pub fn load_stored_session() -> AuthResult<Option<AuthSession>> {
    SessionStore::new().load_session()
}

pub fn clear_stored_session() -> AuthResult<()> {
    SessionStore::new().clear_session()
}
