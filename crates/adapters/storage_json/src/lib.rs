//! # huemqtt-adapter-storage-json
//!
//! Persists the local state file (`{"hue": {"ip": ..., "username": ...}}`)
//! written during pairing.
//!
//! A missing or unreadable file loads as empty state. Keys this bridge does
//! not know about are carried through [`LocalState`] so rewriting the file
//! never drops them.
//!
//! [`LocalState`]: huemqtt_domain::credentials::LocalState

pub mod error;
pub mod store;

pub use error::JsonStoreError;
pub use store::JsonFileStore;
