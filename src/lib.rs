//! Library crate for user-manager.
//!
//! This crate exposes the building blocks of the TUI:
//! - Remote user service contract and clients (`api`)
//! - Application state, controller and event loop (`app`)
//! - Command-line configuration and logging (`cli`)
//! - Client error taxonomy (`error`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `user-manager` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod cli;
pub mod error;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
pub use error::{ApiError, ApiResult};
