//! Core services for discovery, extraction, classification, and file operations

pub mod classify;
pub mod color;
pub mod discover;
pub mod fileops;
pub mod metadata;
pub mod session;
pub mod summary;
