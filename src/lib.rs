//! Song catalogue service: Postgres records with soft deletes, a read-through
//! cache, and verse pagination over lyrics.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
