use std::sync::Arc;

use crate::application::blog_service::BlogService;
use crate::application::identity_service::IdentityService;
use crate::data::repositories::sqlite::post_repository::SqlitePostRepository;
use crate::data::repositories::sqlite::user_repository::SqliteUserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::PasswordVault;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) identity_service: Arc<IdentityService<SqliteUserRepository>>,
    pub(crate) blog_service: Arc<BlogService<SqlitePostRepository>>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    /// Wires repositories and services over one pool and one token service.
    pub(crate) fn from_pool(
        pool: sqlx::SqlitePool,
        jwt: Arc<JwtService>,
        passwords: PasswordVault,
    ) -> Self {
        let identity_service =
            IdentityService::new(SqliteUserRepository::new(pool.clone()), passwords, jwt.clone());
        let blog_service = BlogService::new(SqlitePostRepository::new(pool));

        Self {
            identity_service: Arc::new(identity_service),
            blog_service: Arc::new(blog_service),
            jwt,
        }
    }
}
