//! hubsync remote — HTTP adapter for the hosted dataset catalog
//!
//! Implements the `RemoteCatalog` port from `hubsync-core` on top of
//! `reqwest`. See [`client::RemoteClient`].

pub mod client;

pub use client::RemoteClient;
