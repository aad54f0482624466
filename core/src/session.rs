//! The authenticated user record and its lifecycle.
//!
//! # Design
//! `SessionStore` is an explicit context object owned by the host and passed
//! to whatever needs the current user; there is no global session. The
//! record lives under a single storage key, so at most one user is ever
//! persisted. Login replaces it wholesale and logout deletes it.

use tracing::{info, warn};

use crate::envelope::Envelope;
use crate::services::ApiService;
use crate::storage::{KeyValueStore, StorageError};
use crate::transport::Transport;
use crate::types::{Credentials, LoginResponse, Role, User, UserProfile};

pub const USER_KEY: &str = "user";

#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
    user: Option<User>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap `store` without reading it; call `load` at startup.
    pub fn new(store: S) -> Self {
        Self { store, user: None }
    }

    /// Read the persisted record. A record that no longer decodes is
    /// removed and the session starts signed out.
    pub fn load(&mut self) -> Result<Option<&User>, StorageError> {
        self.user = match self.store.get(USER_KEY)? {
            None => None,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable user record");
                    self.store.remove(USER_KEY)?;
                    None
                }
            },
        };
        Ok(self.user.as_ref())
    }

    pub fn current(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Persist `user`, replacing any previous record.
    pub fn save(&mut self, user: User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&user).map_err(|source| StorageError::Encode {
            what: "user record",
            source,
        })?;
        self.store.set(USER_KEY, &raw)?;
        self.user = Some(user);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(USER_KEY)?;
        self.user = None;
        Ok(())
    }

    /// Authenticate and, on success, persist the returned user.
    pub fn login<T: Transport>(
        &mut self,
        api: &ApiService<T>,
        credentials: &Credentials,
    ) -> Envelope<LoginResponse> {
        let envelope = api.login(credentials);
        let Some(response) = envelope.data() else {
            return envelope;
        };
        if let Err(e) = self.save(response.user.clone()) {
            warn!(error = %e, "login succeeded but the session could not be stored");
            return Envelope::failure(e.to_string());
        }
        info!(user_id = response.user.id, role = ?response.user.role, "signed in");
        envelope
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        if let Some(user) = &self.user {
            info!(user_id = user.id, "signing out");
        }
        self.clear()
    }

    /// Re-fetch the current user (points and level change after reviews)
    /// and replace the stored record.
    pub fn refresh<T: Transport>(&mut self, api: &ApiService<T>) -> Envelope<UserProfile> {
        let Some(id) = self.user.as_ref().map(|u| u.id) else {
            return Envelope::failure("not signed in");
        };
        let envelope = api.user(id);
        if let Some(profile) = envelope.data() {
            if let Err(e) = self.save(profile.user.clone()) {
                return Envelope::failure(e.to_string());
            }
        }
        envelope
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
