use crate::domain::newsletter::{Newsletter, NewsletterPatch};
use crate::utils::error_chain_fmt;
use async_trait::async_trait;

#[derive(thiserror::Error)]
pub enum RepositoryError {
    #[error("newsletter not found")]
    NotFound,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Port over the document store holding magnet pages. Two adapters exist:
/// Supabase (current) and Notion (legacy).
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    async fn fetch_by_template_key(&self, template_key: &str)
        -> Result<Newsletter, RepositoryError>;

    /// Partial, last-writer-wins update of the record identified by
    /// `page_id`. Fields absent from the patch are left untouched.
    async fn update(&self, page_id: &str, patch: &NewsletterPatch) -> Result<(), RepositoryError>;
}
