//! Database repositories for the data access layer
//!
//! Each repository is responsible for a specific entity and provides CRUD
//! operations and specialized queries.

pub mod artifacts;
pub mod mailing_list;
pub mod submissions;
