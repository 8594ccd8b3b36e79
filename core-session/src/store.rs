//! Session Token Store & Hydrator
//!
//! Holds the single authoritative copy of the session bearer token in process
//! memory and mirrors it to durable secure storage. Durable writes are
//! fire-and-forget: losing "remember me across restarts" is an acceptable
//! degradation, losing the current session is not, so persistence failures
//! are logged and swallowed while the in-memory value stays authoritative.
//!
//! Hydration (loading the persisted token at cold start) happens at most once
//! per process lifetime. Concurrent callers racing into an unhydrated store
//! all await one shared operation; durable storage is never read twice.
//!
//! ## Example
//!
//! ```no_run
//! use core_session::SessionStore;
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) {
//! let session = SessionStore::new(secure_store);
//!
//! session.ensure_hydrated().await;
//! if session.get().is_none() {
//!     // prompt sign-in, then:
//!     session.set("token-from-auth-response");
//! }
//! # }
//! ```

use bridge_traits::storage::SecureStore;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fixed durable-storage key holding the session token.
const SESSION_TOKEN_KEY: &str = "session_token";

/// Hydration lifecycle. Monotonic: never regresses from `Hydrated`.
enum HydrationState {
    Unhydrated,
    /// A read of durable storage is in flight; every caller awaits this one
    /// shared operation.
    Hydrating(Shared<BoxFuture<'static, ()>>),
    Hydrated,
}

struct Inner {
    /// The authoritative token. Replaced wholesale, never partially mutated.
    token: RwLock<Option<String>>,
    hydration: Mutex<HydrationState>,
    secure_store: Arc<dyn SecureStore>,
}

/// In-memory session token cache with best-effort durable mirroring.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: RwLock::new(None),
                hydration: Mutex::new(HydrationState::Unhydrated),
                secure_store,
            }),
        }
    }

    /// Current in-memory token, or `None` if never set.
    pub fn get(&self) -> Option<String> {
        self.inner.token.read().clone()
    }

    /// Replace the session token.
    ///
    /// The in-memory value is updated synchronously and is authoritative the
    /// moment this returns. The durable mirror converges on a spawned task;
    /// callers must not assume persistence has completed. Must be called from
    /// within a tokio runtime.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        *self.inner.token.write() = Some(token.clone());
        // An explicit value outranks anything on disk; never hydrate over it.
        *self.inner.hydration.lock() = HydrationState::Hydrated;

        let store = Arc::clone(&self.inner.secure_store);
        tokio::spawn(async move {
            if let Err(e) = store.set_secret(SESSION_TOKEN_KEY, token.as_bytes()).await {
                warn!(error = %e, "Failed to persist session token; session continues in memory");
            }
        });
    }

    /// Drop the session token (logout or detected invalidity).
    ///
    /// The in-memory value is cleared synchronously; the durable copy is
    /// removed best-effort on a spawned task.
    pub fn clear(&self) {
        *self.inner.token.write() = None;
        *self.inner.hydration.lock() = HydrationState::Hydrated;

        let store = Arc::clone(&self.inner.secure_store);
        tokio::spawn(async move {
            if let Err(e) = store.delete_secret(SESSION_TOKEN_KEY).await {
                warn!(error = %e, "Failed to remove persisted session token");
            }
        });
    }

    /// Read the durable copy directly, bypassing the in-memory cache.
    ///
    /// Returns `None` when absent, unreadable, or not valid UTF-8; failures
    /// are logged and swallowed. Used by the hydrator.
    pub async fn read_persisted(&self) -> Option<String> {
        Inner::read_persisted(&self.inner).await
    }

    /// Ensure the persisted token (if any) has been loaded into memory.
    ///
    /// The first caller starts the durable read; everyone arriving while it
    /// is in flight awaits the same shared operation. Once hydrated (or once
    /// `set`/`clear` made an explicit value authoritative) this returns
    /// immediately and durable storage is never touched again.
    pub async fn ensure_hydrated(&self) {
        let shared = {
            let mut state = self.inner.hydration.lock();
            match &*state {
                HydrationState::Hydrated => return,
                HydrationState::Hydrating(fut) => fut.clone(),
                HydrationState::Unhydrated => {
                    let inner = Arc::clone(&self.inner);
                    let fut = async move {
                        let persisted = Inner::read_persisted(&inner).await;
                        // A set()/clear() that landed while the read was in
                        // flight already flipped the state to Hydrated; the
                        // stale read must not win over it. Checked under the
                        // hydration lock, with the cache write inside it.
                        let mut state = inner.hydration.lock();
                        if !matches!(*state, HydrationState::Hydrated) {
                            if let Some(token) = persisted {
                                let mut cache = inner.token.write();
                                if cache.is_none() {
                                    *cache = Some(token);
                                }
                            }
                        }
                        *state = HydrationState::Hydrated;
                        debug!("Session hydrated");
                    }
                    .boxed()
                    .shared();
                    *state = HydrationState::Hydrating(fut.clone());
                    fut
                }
            }
        };

        shared.await;
    }
}

impl Inner {
    async fn read_persisted(inner: &Arc<Inner>) -> Option<String> {
        match inner.secure_store.get_secret(SESSION_TOKEN_KEY).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(token) => Some(token),
                Err(_) => {
                    warn!("Persisted session token is not valid UTF-8; ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session token; starting unauthenticated");
                None
            }
        }
    }
}
