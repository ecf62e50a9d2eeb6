pub(crate) mod blog_service;
pub(crate) mod identity_service;
