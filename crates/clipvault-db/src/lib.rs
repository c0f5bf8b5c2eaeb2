//! Clipvault record store
//!
//! sqlx/Postgres repositories holding one row per submission, the mailing
//! list, and the companion artifact objects (signature backups, audit text).
//! Repositories are the only writers; domain models returned here are clean
//! of row-layout details. Services depend on the `RecordStore` trait so tests
//! can substitute an in-memory implementation.

pub mod db;
pub mod store;

pub use db::artifacts::ArtifactRepository;
pub use db::mailing_list::MailingListRepository;
pub use db::submissions::SubmissionRepository;
pub use store::{PgRecordStore, RecordStore};
