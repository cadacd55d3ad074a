//! Core types shared by every stache-view module.
//!
//! At the moment this is the error surface: [`ViewError`] and the crate-wide
//! [`Result`] alias.

pub mod error;

pub use error::{Result, ViewError};
