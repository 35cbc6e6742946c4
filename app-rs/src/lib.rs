//! The native Rust core of the Cuisineberg retail app.
//!
//! A thin presentation shell (the mobile UI) drives this crate: it constructs
//! an [`App`] via login or from the stored session token, renders snapshots
//! of the [`MenuDb`] state, and forwards user intents (load, add, edit,
//! delete, search) as calls into the session operations. The shell never
//! mutates session state directly.
//!
//! [`App`]: crate::app::App
//! [`MenuDb`]: crate::menu::MenuDb

/// The top-level App state: session construction, teardown, and the
/// operations exposed to the shell.
pub mod app;
/// Typed clients for the Cuisineberg backend and the geo reference host.
pub mod client;
/// The session error taxonomy surfaced to the shell.
pub mod error;
/// UI form input helpers.
mod form;
/// Country/state/city picker state for the registration form.
pub mod location;
/// The menu session: local mirror of the restaurant profile + menu list and
/// the operations that keep it in sync with the backend.
pub mod menu;
/// One-shot notification channel, used as the session cancellation signal.
pub mod notify_once;
/// Securely store and retrieve the session token to and from each platform's
/// standard secret storage.
pub mod secret_store;
