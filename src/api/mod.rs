//! HubSpot API access with connected credentials

pub mod contacts;

pub use contacts::ContactsClient;
