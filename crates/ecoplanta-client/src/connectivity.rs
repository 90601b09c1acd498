//! Live-backend connectivity signal
//!
//! A single tri-state value describing the outcome of the most recent live
//! call. [`ConnectivityState`] is the writer, owned by the request executor;
//! any number of [`ConnectivityMonitor`]s read it by polling or subscription.
//!
//! The value reflects the live backend only. A call that got no 2xx leaves
//! the state `Offline` even when a fallback snapshot was served; a 2xx whose
//! body did not decode still counts as `Online`.
//! Concurrent calls race on the value; whichever live call resolved last wins.

use serde::Serialize;
use std::fmt;
use tokio::sync::watch;

/// Live backend connectivity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// No live call attempted yet
    #[default]
    Unknown,
    /// Most recent live call succeeded
    Online,
    /// Most recent live call failed, whether or not a fallback was served
    Offline,
}

impl Connectivity {
    /// Lowercase label for status indicators
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writer side of the connectivity signal
#[derive(Debug)]
pub struct ConnectivityState {
    tx: watch::Sender<Connectivity>,
}

impl ConnectivityState {
    /// New state, initialised to `Unknown`
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Connectivity::Unknown);
        Self { tx }
    }

    /// Reader handle
    #[must_use]
    pub fn monitor(&self) -> ConnectivityMonitor {
        ConnectivityMonitor {
            rx: self.tx.subscribe(),
        }
    }

    /// Current value
    #[inline]
    #[must_use]
    pub fn current(&self) -> Connectivity {
        *self.tx.borrow()
    }

    /// Replace the value, returning the previous one
    ///
    /// Subscribers are notified only when the value actually changes.
    pub(crate) fn record(&self, next: Connectivity) -> Connectivity {
        let mut previous = next;
        self.tx.send_if_modified(|value| {
            previous = *value;
            if *value == next {
                return false;
            }
            *value = next;
            true
        });

        if previous != next {
            tracing::info!("Live API connectivity: {} -> {}", previous, next);
        }
        previous
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader side of the connectivity signal
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    rx: watch::Receiver<Connectivity>,
}

impl ConnectivityMonitor {
    /// Current value (polling)
    #[inline]
    #[must_use]
    pub fn current(&self) -> Connectivity {
        *self.rx.borrow()
    }

    /// Shorthand for `current() == Online`
    #[inline]
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.current() == Connectivity::Online
    }

    /// Wait for the next change and return the new value
    ///
    /// Returns `None` once the writer is gone.
    pub async fn changed(&mut self) -> Option<Connectivity> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Wait until the value satisfies `predicate`
    ///
    /// Returns immediately if it already does; `None` once the writer is gone.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(Connectivity) -> bool,
    ) -> Option<Connectivity> {
        self.rx
            .wait_for(|value| predicate(*value))
            .await
            .ok()
            .map(|value| *value)
    }

    /// Raw watch receiver for integration with other async code
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.rx.clone()
    }
}
