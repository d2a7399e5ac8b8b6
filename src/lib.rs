//! HubSpot connect-account flow
//!
//! Client side of the "connect your HubSpot account" handshake: ask the
//! integrations backend for an authorization URL, open it in a popup, poll
//! until the popup closes, then fetch the credentials the backend stored and
//! merge them into the host's integration parameters.

pub mod api;
pub mod backend;
pub mod config;
pub mod connect;
pub mod error;
pub mod integration;
pub mod models;
pub mod popup;

pub use backend::{Backend, HttpBackend, Identity};
pub use config::Config;
pub use connect::{ConnectController, ConnectOutcome, IntegrationProfile, Notifier};
pub use error::{BackendError, ContactsError, HandshakeError};
pub use integration::{ConnectionStatus, IntegrationParams, IntegrationStore, MemoryStore};
