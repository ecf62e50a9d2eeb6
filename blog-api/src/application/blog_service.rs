use tracing::{info, warn};

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostQuery, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, PostId, UpdatePostRequest};

pub(crate) const DEFAULT_PAGE: u32 = 1;
pub(crate) const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default)]
pub(crate) struct ListPostsParams {
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
    pub(crate) category: Option<String>,
}

pub(crate) struct BlogService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> BlogService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Newest first, `limit` posts starting after `(page - 1) * limit`.
    /// A page past the end is an empty list, not an error. The category is
    /// compared byte for byte; an empty one means no filter.
    /// Callers reject `page` and `limit` of 0 before getting here.
    pub(crate) async fn list_posts(&self, params: ListPostsParams) -> Result<Vec<Post>, DomainError> {
        let query = PostQuery {
            pagination: Pagination {
                page: params.page.unwrap_or(DEFAULT_PAGE),
                limit: params.limit.unwrap_or(DEFAULT_LIMIT),
            },
            category: params.category.filter(|category| !category.is_empty()),
        };
        self.repo.list_posts(query).await
    }

    /// The author is always the caller; clients cannot choose it.
    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            category: req.category,
            author_id,
        };
        let post = self.repo.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    pub(crate) async fn get_post(&self, raw_id: &str) -> Result<Post, DomainError> {
        let id = PostId::parse(raw_id)?;
        self.find_existing(id).await
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        raw_id: &str,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let id = PostId::parse(raw_id)?;
        let existing = self.find_existing(id).await?;
        Self::ensure_owner(&existing, actor_user_id, "update")?;

        let req = req.validate()?;
        let patch = PostPatch {
            title: req.title.unwrap_or(existing.title),
            content: req.content.unwrap_or(existing.content),
        };

        // Guarded write: a post deleted or reassigned since the check reads as gone.
        let post = self
            .repo
            .update_post_owned(id, actor_user_id, patch)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        info!(post_id = post.id, author_id = actor_user_id, "post updated");
        Ok(post)
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        raw_id: &str,
    ) -> Result<(), DomainError> {
        let id = PostId::parse(raw_id)?;
        let existing = self.find_existing(id).await?;
        Self::ensure_owner(&existing, actor_user_id, "delete")?;

        let deleted = self.repo.delete_post_owned(id, actor_user_id).await?;
        if !deleted {
            return Err(DomainError::NotFound("Post"));
        }
        info!(post_id = id.get(), author_id = actor_user_id, "post deleted");
        Ok(())
    }

    async fn find_existing(&self, id: PostId) -> Result<Post, DomainError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or(DomainError::NotFound("Post"))
    }

    // Existence is already established here, so a non-owner learns the post exists.
    fn ensure_owner(post: &Post, actor_user_id: i64, action: &'static str) -> Result<(), DomainError> {
        if post.is_authored_by(actor_user_id) {
            return Ok(());
        }
        warn!(
            post_id = post.id,
            actor_user_id, action, "rejected mutation by non-author"
        );
        Err(DomainError::Forbidden { action })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::{BlogService, ListPostsParams};
    use crate::data::post_repository::{NewPost, PostPatch, PostQuery, PostRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::{Author, CreatePostRequest, Post, PostId, UpdatePostRequest};

    #[derive(Clone)]
    struct FakePostRepo {
        created_input: Arc<Mutex<Option<NewPost>>>,
        post_for_get: Arc<Mutex<Option<Post>>>,
        update_owned_result: Arc<Mutex<Option<Post>>>,
        update_owned_call: Arc<Mutex<Option<(PostId, i64, PostPatch)>>>,
        delete_owned_result: Arc<Mutex<bool>>,
        delete_owned_calls: Arc<Mutex<usize>>,
        list_call: Arc<Mutex<Option<PostQuery>>>,
        list_result: Arc<Mutex<Vec<Post>>>,
    }

    impl FakePostRepo {
        fn new() -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                post_for_get: Arc::new(Mutex::new(None)),
                update_owned_result: Arc::new(Mutex::new(None)),
                update_owned_call: Arc::new(Mutex::new(None)),
                delete_owned_result: Arc::new(Mutex::new(true)),
                delete_owned_calls: Arc::new(Mutex::new(0)),
                list_call: Arc::new(Mutex::new(None)),
                list_result: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn with_stored(post: Post) -> Self {
            let repo = Self::new();
            *repo
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned") = Some(post);
            repo
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            Ok(sample_post(1, &input.title, &input.content, input.author_id))
        }

        async fn get_post(&self, _id: PostId) -> Result<Option<Post>, DomainError> {
            Ok(self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone())
        }

        async fn update_post_owned(
            &self,
            id: PostId,
            owner_id: i64,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            *self
                .update_owned_call
                .lock()
                .expect("update_owned_call mutex poisoned") = Some((id, owner_id, patch));
            Ok(self
                .update_owned_result
                .lock()
                .expect("update_owned_result mutex poisoned")
                .clone())
        }

        async fn delete_post_owned(&self, _id: PostId, _owner_id: i64) -> Result<bool, DomainError> {
            *self
                .delete_owned_calls
                .lock()
                .expect("delete_owned_calls mutex poisoned") += 1;
            Ok(*self
                .delete_owned_result
                .lock()
                .expect("delete_owned_result mutex poisoned"))
        }

        async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, DomainError> {
            *self.list_call.lock().expect("list_call mutex poisoned") = Some(query);
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }
    }

    #[tokio::test]
    async fn create_post_forces_author_to_caller() {
        let repo = FakePostRepo::new();
        let service = BlogService::new(repo.clone());

        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            content: "  content  ".to_string(),
            category: None,
        };

        let created = service
            .create_post(10, req)
            .await
            .expect("create_post must succeed");

        assert_eq!(created.title, "title");
        assert_eq!(created.author.id, 10);

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.title, "title");
        assert_eq!(input.content, "content");
        assert_eq!(input.author_id, 10);
    }

    #[tokio::test]
    async fn create_post_rejects_missing_content_before_repo_call() {
        let repo = FakePostRepo::new();
        let service = BlogService::new(repo.clone());

        let req = CreatePostRequest {
            title: "title".to_string(),
            content: String::new(),
            category: None,
        };

        let err = service
            .create_post(10, req)
            .await
            .expect_err("content is required");
        assert!(matches!(err, DomainError::Validation { field: "content", .. }));
        assert!(
            repo.created_input
                .lock()
                .expect("created_input mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let service = BlogService::new(FakePostRepo::new());

        let err = service
            .get_post("42")
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_post_treats_malformed_id_as_not_found() {
        let service = BlogService::new(FakePostRepo::with_stored(sample_post(1, "t", "c", 10)));

        let err = service
            .get_post("not-an-id")
            .await
            .expect_err("malformed id must not resolve");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_post_merges_omitted_fields_and_uses_guarded_write() {
        let repo = FakePostRepo::with_stored(sample_post(7, "old title", "old body", 10));
        *repo
            .update_owned_result
            .lock()
            .expect("update_owned_result mutex poisoned") =
            Some(sample_post(7, "new", "old body", 10));

        let service = BlogService::new(repo.clone());
        let req = UpdatePostRequest {
            title: Some("  new  ".to_string()),
            content: None,
        };

        let updated = service
            .update_post(10, "7", req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.id, 7);

        let (id, owner, patch) = repo
            .update_owned_call
            .lock()
            .expect("update_owned_call mutex poisoned")
            .clone()
            .expect("update call must be captured");
        assert_eq!(id.get(), 7);
        assert_eq!(owner, 10);
        assert_eq!(patch.title, "new");
        assert_eq!(patch.content, "old body");
    }

    #[tokio::test]
    async fn update_post_returns_forbidden_for_non_owner_without_writing() {
        let repo = FakePostRepo::with_stored(sample_post(7, "title", "body", 99));
        let service = BlogService::new(repo.clone());

        let err = service
            .update_post(10, "7", UpdatePostRequest::default())
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden { action: "update" }));
        assert!(
            repo.update_owned_call
                .lock()
                .expect("update_owned_call mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_post_reports_missing_before_forbidden() {
        let service = BlogService::new(FakePostRepo::new());

        let err = service
            .update_post(10, "7", UpdatePostRequest::default())
            .await
            .expect_err("must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_post_rejects_explicit_empty_title() {
        let repo = FakePostRepo::with_stored(sample_post(7, "title", "body", 10));
        let service = BlogService::new(repo);

        let req = UpdatePostRequest {
            title: Some(String::new()),
            content: None,
        };
        let err = service
            .update_post(10, "7", req)
            .await
            .expect_err("empty title must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
    }

    #[tokio::test]
    async fn update_post_lost_guarded_write_reads_as_not_found() {
        let repo = FakePostRepo::with_stored(sample_post(7, "title", "body", 10));
        let service = BlogService::new(repo);

        let err = service
            .update_post(10, "7", UpdatePostRequest::default())
            .await
            .expect_err("concurrent delete must surface as not found");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_post_returns_forbidden_for_non_owner() {
        let repo = FakePostRepo::with_stored(sample_post(7, "title", "body", 99));
        let service = BlogService::new(repo.clone());

        let err = service
            .delete_post(10, "7")
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden { action: "delete" }));
        assert_eq!(
            *repo
                .delete_owned_calls
                .lock()
                .expect("delete_owned_calls mutex poisoned"),
            0
        );
    }

    #[tokio::test]
    async fn delete_post_succeeds_for_owner() {
        let repo = FakePostRepo::with_stored(sample_post(7, "title", "body", 10));
        let service = BlogService::new(repo.clone());

        service
            .delete_post(10, "7")
            .await
            .expect("owner can delete");
        assert_eq!(
            *repo
                .delete_owned_calls
                .lock()
                .expect("delete_owned_calls mutex poisoned"),
            1
        );
    }

    #[tokio::test]
    async fn list_posts_applies_defaults_and_keeps_category_verbatim() {
        let repo = FakePostRepo::new();
        *repo.list_result.lock().expect("list_result mutex poisoned") =
            vec![sample_post(1, "a", "b", 10)];

        let service = BlogService::new(repo.clone());
        let posts = service
            .list_posts(ListPostsParams {
                category: Some(" rust ".to_string()),
                ..ListPostsParams::default()
            })
            .await
            .expect("list_posts must succeed");
        assert_eq!(posts.len(), 1);

        let query = repo
            .list_call
            .lock()
            .expect("list_call mutex poisoned")
            .clone()
            .expect("list call must be captured");
        assert_eq!(query.pagination.page, 1);
        assert_eq!(query.pagination.limit, 10);
        assert_eq!(query.category.as_deref(), Some(" rust "));
    }

    #[tokio::test]
    async fn list_posts_treats_empty_category_as_no_filter() {
        let repo = FakePostRepo::new();
        let service = BlogService::new(repo.clone());

        service
            .list_posts(ListPostsParams {
                page: Some(3),
                limit: Some(2),
                category: Some(String::new()),
            })
            .await
            .expect("list_posts must succeed");

        let query = repo
            .list_call
            .lock()
            .expect("list_call mutex poisoned")
            .clone()
            .expect("list call must be captured");
        assert_eq!(query.pagination.offset(), 4);
        assert!(query.category.is_none());
    }

    fn sample_post(id: i64, title: &str, content: &str, author_id: i64) -> Post {
        let author = Author {
            id: author_id,
            username: format!("user{author_id}"),
        };
        Post::new(
            id,
            title.to_string(),
            content.to_string(),
            author,
            None,
            Utc::now(),
            Utc::now(),
        )
        .expect("sample post must be valid")
    }
}
