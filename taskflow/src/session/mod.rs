//! Persisted session state: the signed-in user and the bearer credential.
//!
//! The store is the only component that touches durable session state.
//! Two fixed file names under the state directory back it: `auth_token`
//! (the raw bearer token) and `auth_user.json` (the serialized user
//! record). Both are written together on [`SessionStore::set`] and
//! removed together on [`SessionStore::clear`]; a missing token file
//! means no session, regardless of what else is on disk.
//!
//! No token freshness check happens here; the gateway treats any 401
//! as "session over" and calls [`SessionStore::clear`].

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use taskflow_proto::auth::User;

/// File name for the persisted bearer token.
const TOKEN_FILE: &str = "auth_token";

/// File name for the persisted user record.
const USER_FILE: &str = "auth_user.json";

/// Errors that can occur while persisting session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to read or write a session file.
    #[error("session file {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to serialize the user record.
    #[error("failed to encode user record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// An active session: the authenticated user plus the bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The authenticated user record.
    pub user: User,
    /// Opaque bearer token proving the session to the server.
    pub token: String,
}

/// In-memory session state with persisted backing.
///
/// `init` reads the persisted state exactly once at startup; after
/// that, `set` and `clear` are the only mutation paths, and both keep
/// the files in sync with the in-memory value.
pub struct SessionStore {
    dir: PathBuf,
    current: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Open the store rooted at `dir`, loading any persisted session.
    ///
    /// A missing or unreadable token file yields an empty store. A
    /// present token with a corrupt user record is treated as absent
    /// and the leftover files are removed.
    #[must_use]
    pub fn init(dir: PathBuf) -> Self {
        let store = Self {
            dir,
            current: Mutex::new(None),
        };
        match store.load_persisted() {
            Some(session) => {
                tracing::debug!(user_id = session.user.id, "restored persisted session");
                *store.current.lock() = Some(session);
            }
            None => store.remove_files(),
        }
        store
    }

    /// The current session, if any.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    /// The bearer token of the current session, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current.lock().as_ref().map(|s| s.token.clone())
    }

    /// Whether a session is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Install a new session and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the session files cannot be written;
    /// the in-memory session is still installed so the running process
    /// keeps working (it just will not survive a restart).
    pub fn set(&self, user: User, token: String) -> Result<(), SessionError> {
        let session = Session { user, token };
        *self.current.lock() = Some(session.clone());
        self.persist(&session)
    }

    /// Drop the session and its persisted backing.
    ///
    /// Removal failures are logged, not surfaced: the in-memory clear
    /// is what the rest of the client observes.
    pub fn clear(&self) {
        if self.current.lock().take().is_some() {
            tracing::info!("session cleared");
        }
        self.remove_files();
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }

    fn load_persisted(&self) -> Option<Session> {
        let token = std::fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim().to_string();
        if token.is_empty() {
            return None;
        }
        let user_json = std::fs::read_to_string(self.user_path()).ok()?;
        let user: User = serde_json::from_str(&user_json).ok()?;
        Some(Session { user, token })
    }

    fn persist(&self, session: &Session) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SessionError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        write_file(&self.token_path(), &session.token)?;
        let user_json = serde_json::to_string(&session.user)?;
        write_file(&self.user_path(), &user_json)?;
        Ok(())
    }

    fn remove_files(&self) {
        for path in [self.token_path(), self.user_path()] {
            if let Err(e) = std::fs::remove_file(&path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove session file");
            }
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), SessionError> {
    std::fs::write(path, contents).map_err(|e| SessionError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
