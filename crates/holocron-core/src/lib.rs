//! Core types and trait definitions for the Holocron archive.
//!
//! A Holocron archive holds a normalized copy of six entity collections
//! (films, people, planets, species, starships, vehicles) and the
//! many-to-many relationships between them. Snapshots arrive as decoded
//! response records cross-referenced by URL; backends materialize them and
//! serve relationship queries.
//!
//! This crate is deliberately free of database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod change;
pub mod config;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod measure;
pub mod relationship;
pub mod response;
pub mod store;

pub use error::{Error, Result};
