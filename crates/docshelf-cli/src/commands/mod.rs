//! Command handlers

pub mod config;
pub mod document;
pub mod import;
pub mod status;
