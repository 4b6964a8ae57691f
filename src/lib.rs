//! folio: photo-portfolio catalog service.
//!
//! An HTTP backend that registers uploaded photos, groups them into
//! categories and curates an ordered homepage selection.
//!
//! - [`store`] - JSON document store (redb or in-memory) with atomic batches
//! - [`catalog`] - Membership and ordering rules over the store
//! - [`auth`] - Bearer token verification
//! - [`http`] - axum router and handlers
//! - [`config`] - `folio.toml` loading and validation

pub mod auth;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod paths;
pub mod store;
