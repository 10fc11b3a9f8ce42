//! Application services: the song facade and the ports it drives.

pub mod cache;
pub mod context;
pub mod error;
pub mod pagination;
pub mod repos;
pub mod songs;
