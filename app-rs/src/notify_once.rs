//! One-shot notification channel used as the session cancellation signal.
//!
//! [`App::logout`] sends on the session's [`NotifyOnce`]; every in-flight
//! menu operation races its own clone against the pending request and
//! resolves `Cancelled` if the signal wins, leaving local state untouched.
//!
//! [`App::logout`]: crate::app::App::logout

use std::sync::Arc;

use tokio::sync::Semaphore;

/// Sends a notification to all consumers *once*. Most commonly used to tear
/// down a session: one `send` cancels every operation still in flight.
///
/// Features:
///
/// - Multi-producer and multi-consumer - simply clone to get another handle.
/// - Every clone observes a signal at-most-once. If the signal has already
///   been sent, new clones can still observe it once.
/// - Consumers can receive signals that were sent prior to 'subscribing' to
///   the channel (unlike [`tokio::sync::broadcast`]);
/// - It is safe to send a signal multiple times (e.g. by accident).
///
/// The underlying implementation (ab)uses the fact that calling [`acquire`]
/// on a [`Semaphore`] with 0 permits only returns once the [`Semaphore`] has
/// been closed. Closing the [`Semaphore`] is equivalent to sending a signal,
/// and receiving an [`AcquireError`] (indicating the [`Semaphore`] has been
/// closed) from a call to [`acquire`] is equivalent to receiving one.
///
/// [`acquire`]: Semaphore::acquire
/// [`AcquireError`]: tokio::sync::AcquireError
#[derive(Debug)]
pub struct NotifyOnce {
    inner: Arc<Semaphore>,
    have_recved: bool,
}

impl NotifyOnce {
    /// Construct a new [`NotifyOnce`].
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let inner = Arc::new(Semaphore::new(0));
        Self {
            inner,
            have_recved: false,
        }
    }

    /// Send a signal, causing all actors waiting on this channel to complete
    /// their call to [`recv`].
    ///
    /// [`recv`]: NotifyOnce::recv
    pub fn send(&self) {
        self.inner.close();
    }

    /// Wait for a signal.
    ///
    /// NOTE: If this `NotifyOnce` has already observed a signal,
    /// _this future will never return!_ Operations racing a request against
    /// the signal must use a fresh clone per race.
    pub async fn recv(&mut self) {
        if self.have_recved {
            // THIS FUTURE WILL NEVER RESOLVE
            std::future::pending().await
        } else {
            // wait for a signal
            self.inner
                .acquire()
                .await
                .map_err(|_| ())
                .expect_err("Shouldn't've been able to acquire a permit");
            // we've seen a signal;
            // if this method gets called again, it won't yield.
            self.have_recved = true;
        }
    }

    /// Immediately returns whether a signal has been sent.
    /// This bypasses the at-most-once logic; calling this function will NOT
    /// consume the signal for a later call to [`recv`](Self::recv).
    #[must_use]
    pub fn try_recv(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Clone for NotifyOnce {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            // Every clone gets a chance to see the signal, even if the
            // original has already seen it.
            have_recved: false,
        }
    }
}
