//! Session lifecycle — connect/disconnect/reconnect around the gateway
//! client.
//!
//! The state machine is deliberately small: `disconnected` → `connected`
//! after a successful login, back to `disconnected` after logout or a
//! login failure. A failed login is logged, never raised, and never
//! retried here; a supervising watchdog may call [`Session::reconnect`].

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ports::GatewayClient;

/// Gateway session holder shared by both engines.
pub struct Session<G> {
    gateway: Arc<G>,
    // Guards connect/disconnect against concurrent use from a truly
    // concurrent host.
    connected: Mutex<bool>,
}

impl<G: GatewayClient> Session<G> {
    /// Create a session in the `disconnected` state.
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            connected: Mutex::new(false),
        }
    }

    /// Attempt a login.
    ///
    /// On authentication failure the session stays disconnected and the
    /// failure is logged — nothing propagates to the caller and there is
    /// no retry.
    pub async fn connect(&self) {
        let mut connected = self.connected.lock().await;
        if *connected {
            tracing::debug!("already connected");
            return;
        }
        match self.gateway.login().await {
            Ok(()) => {
                *connected = true;
                tracing::info!("gateway login successful");
            }
            Err(err) => {
                tracing::warn!(error = %err, "gateway login failed");
            }
        }
    }

    /// Log out if currently holding a session; idempotent otherwise.
    pub async fn disconnect(&self) {
        let mut connected = self.connected.lock().await;
        if !*connected {
            return;
        }
        if let Err(err) = self.gateway.logout().await {
            tracing::warn!(error = %err, "gateway logout failed");
        } else {
            tracing::info!("gateway logout successful");
        }
        *connected = false;
    }

    /// Disconnect followed immediately by a single connect attempt.
    ///
    /// No backoff, no bounded retry count — invoked externally, not by
    /// the poll cycle engine on fetch failure.
    pub async fn reconnect(&self) {
        self.disconnect().await;
        self.connect().await;
    }

    /// Whether a session is currently held.
    pub async fn is_connected(&self) -> bool {
        *self.connected.lock().await
    }
}
