//! Domain layer for the session.

pub mod config;
pub mod view;
