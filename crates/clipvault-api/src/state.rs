//! Application state.
//!
//! One shared state object holding the configuration, the record store, the
//! mailing list repository, and the three domain services. Handlers extract
//! `State<Arc<AppState>>` and use only what they need.

use clipvault_core::Config;
use clipvault_db::MailingListRepository;
use clipvault_services::{AdminQueryService, ModerationService, SubmissionUploadService};

pub struct AppState {
    pub config: Config,
    pub mailing_list: MailingListRepository,
    pub upload: SubmissionUploadService,
    pub moderation: ModerationService,
    pub admin: AdminQueryService,
}
