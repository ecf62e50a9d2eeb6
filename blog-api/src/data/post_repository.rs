use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostId};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) category: Option<String>,
    pub(crate) author_id: i64,
}

/// Full replacement values for a guarded update.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

impl Pagination {
    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)).saturating_mul(i64::from(self.limit))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PostQuery {
    pub(crate) pagination: Pagination,
    pub(crate) category: Option<String>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: PostId) -> Result<Option<Post>, DomainError>;
    /// Applies `patch` only if the post is still owned by `owner_id`.
    async fn update_post_owned(
        &self,
        id: PostId,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    /// Deletes only if the post is still owned by `owner_id`.
    async fn delete_post_owned(&self, id: PostId, owner_id: i64) -> Result<bool, DomainError>;
    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, DomainError>;
}
