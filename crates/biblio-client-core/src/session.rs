//! Single source of truth for who is logged in
//!
//! The token and identity are only ever written together by [`SessionStore`]
//! and only through login, logout and expiry. Everything else reads.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Context as _};
use biblio_shared::{
    const_config::{
        event::{EVENT_LOGGED_IN, EVENT_LOGGED_OUT, EVENT_SESSION_EXPIRED},
        storage::{STORAGE_KEY_TOKEN, STORAGE_KEY_USER},
    },
    log_err_as_warn,
    token::AuthToken,
    uac::{Identity, Role},
};
use futures::channel::mpsc;
use tracing::{info, warn};

use crate::{storage::SessionStorage, ApiError};

/// A bearer token paired with the identity it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: AuthToken,
    pub identity: Arc<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Raised on login and when a persisted session is restored
    LoggedIn(Arc<Identity>),
    LoggedOut,
    /// The backend rejected the credential of an active session
    Expired,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::LoggedIn(_) => EVENT_LOGGED_IN,
            SessionEvent::LoggedOut => EVENT_LOGGED_OUT,
            SessionEvent::Expired => EVENT_SESSION_EXPIRED,
        }
    }

    /// Returns `true` if the session event is [`Expired`]
    ///
    /// [`Expired`]: SessionEvent::Expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

/// Shared handle to the session, clones refer to the same session
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionInner>>,
}

#[derive(Debug)]
struct SessionInner {
    session: Option<Session>,
    is_loading: bool,
    storage: Box<dyn SessionStorage>,
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl SessionStore {
    /// Creates the store and restores any persisted session before returning
    #[tracing::instrument(name = "NEW SESSION-STORE", skip(storage))]
    pub fn new<S: SessionStorage + 'static>(storage: S) -> Self {
        let result = Self::unhydrated(storage);
        result.rehydrate();
        result
    }

    /// Creates the store without reading storage yet, [`Self::is_loading`]
    /// stays `true` until [`Self::rehydrate`] is called
    pub fn unhydrated<S: SessionStorage + 'static>(storage: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                session: None,
                is_loading: true,
                storage: Box::new(storage),
                subscribers: Vec::new(),
            })),
        }
    }

    /// Loads the persisted session, discarding it if it is incomplete or
    /// unreadable
    #[tracing::instrument(skip(self))]
    pub fn rehydrate(&self) {
        let mut inner = self.lock();
        inner.is_loading = true;
        let restored = match load_persisted(inner.storage.as_ref()) {
            Ok(restored) => restored,
            Err(e) => {
                warn!(?e, "discarding persisted session");
                clear_persisted(inner.storage.as_mut());
                None
            }
        };
        if let Some(session) = &restored {
            info!(identity = %session.identity, "session restored");
        }
        let event = restored
            .as_ref()
            .map(|session| SessionEvent::LoggedIn(Arc::clone(&session.identity)));
        inner.session = restored;
        inner.is_loading = false;
        if let Some(event) = event {
            inner.notify(event);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.lock()
            .session
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn identity(&self) -> Option<Arc<Identity>> {
        self.lock()
            .session
            .as_ref()
            .map(|session| Arc::clone(&session.identity))
    }

    /// [`Role::Anonymous`] when nobody is logged in
    pub fn role(&self) -> Role {
        self.lock()
            .session
            .as_ref()
            .map(|session| session.identity.role)
            .unwrap_or_default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_some()
    }

    /// Receives every change to the session from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.lock().subscribers.push(tx);
        rx
    }

    /// Clears the session and storage. Safe to call when already logged out.
    #[tracing::instrument(skip(self))]
    pub fn logout(&self) {
        let mut inner = self.lock();
        clear_persisted(inner.storage.as_mut());
        if inner.session.take().is_some() {
            info!("logged out");
            inner.notify(SessionEvent::LoggedOut);
        }
    }

    /// Persists and activates a new session, replacing any current one
    ///
    /// If storage fails nothing changes in memory and storage is rolled back
    /// to the prior session (or left without either key if there was none)
    #[tracing::instrument(skip(self, token))]
    pub(crate) fn establish(
        &self,
        token: AuthToken,
        identity: Identity,
    ) -> Result<Arc<Identity>, ApiError> {
        let identity = Arc::new(identity);
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Err(e) = persist(
            inner.storage.as_mut(),
            &token,
            &identity,
            inner.session.as_ref(),
        ) {
            warn!(?e, "failed to persist session, rolled back");
            return Err(ApiError::Storage {
                message: format!("{e:#}"),
            });
        }
        inner.session = Some(Session {
            token,
            identity: Arc::clone(&identity),
        });
        inner.notify(SessionEvent::LoggedIn(Arc::clone(&identity)));
        Ok(identity)
    }

    /// Clears the session if it still uses `rejected`
    ///
    /// Returns `true` if this call ended the session. Responses for a token
    /// that has already been replaced or cleared do nothing so concurrent
    /// rejections only raise one [`SessionEvent::Expired`].
    #[tracing::instrument(skip_all)]
    pub(crate) fn expire(&self, rejected: &AuthToken) -> bool {
        let mut inner = self.lock();
        let is_current = inner
            .session
            .as_ref()
            .is_some_and(|session| &session.token == rejected);
        if !is_current {
            return false;
        }
        inner.session = None;
        clear_persisted(inner.storage.as_mut());
        warn!("session expired");
        inner.notify(SessionEvent::Expired);
        true
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session mutex poisoned")
    }
}

impl SessionInner {
    fn notify(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }
}

fn load_persisted(storage: &dyn SessionStorage) -> anyhow::Result<Option<Session>> {
    let token = storage.get(STORAGE_KEY_TOKEN)?;
    let user = storage.get(STORAGE_KEY_USER)?;
    match (token, user) {
        (None, None) => Ok(None),
        (Some(token), Some(user)) => {
            let token = AuthToken::try_from(token).context("persisted token is invalid")?;
            let identity: Identity =
                serde_json::from_str(&user).context("persisted user is not a valid identity")?;
            if identity.role == Role::Anonymous {
                bail!("persisted user has no role");
            }
            Ok(Some(Session {
                token,
                identity: Arc::new(identity),
            }))
        }
        (Some(_), None) => bail!("token persisted without a user"),
        (None, Some(_)) => bail!("user persisted without a token"),
    }
}

/// Writes `user` then `token`
///
/// If the token cannot be written the user key is put back to match `prior`
/// so storage keeps agreeing with the session still held in memory
fn persist(
    storage: &mut dyn SessionStorage,
    token: &AuthToken,
    identity: &Identity,
    prior: Option<&Session>,
) -> anyhow::Result<()> {
    let user = serde_json::to_string(identity).context("failed to serialize identity")?;
    storage.set(STORAGE_KEY_USER, &user)?;
    if let Err(e) = storage.set(STORAGE_KEY_TOKEN, token.expose()) {
        restore_user(storage, prior);
        return Err(e);
    }
    Ok(())
}

fn restore_user(storage: &mut dyn SessionStorage, prior: Option<&Session>) {
    let Some(prior) = prior else {
        clear_persisted(storage);
        return;
    };
    let restored = serde_json::to_string(prior.identity.as_ref())
        .context("failed to serialize prior identity")
        .and_then(|user| storage.set(STORAGE_KEY_USER, &user));
    if let Err(e) = restored {
        warn!(?e, "failed to restore prior user in storage");
        clear_persisted(storage);
    }
}

fn clear_persisted(storage: &mut dyn SessionStorage) {
    log_err_as_warn!(storage.remove(STORAGE_KEY_TOKEN));
    log_err_as_warn!(storage.remove(STORAGE_KEY_USER));
}
