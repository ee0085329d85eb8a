// sello/src/wizard/store.rs
use super::ProductDraft;
use crate::core::Result;

/// Acknowledgement returned by the external save capability.
#[derive(Debug, Clone)]
pub struct DraftAck {
    pub draft_id: String,
}

/// Draft persistence capability consumed by the wizard on submit. The crate
/// never retries a failed save; retry is the caller's decision.
pub trait DraftStore {
    fn save_draft(&self, draft: &ProductDraft) -> Result<DraftAck>;
}
