//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod filter;
mod mailing_list;
mod submission;
mod upload;

// Re-export all models for convenient imports
pub use filter::*;
pub use mailing_list::*;
pub use submission::*;
pub use upload::*;
