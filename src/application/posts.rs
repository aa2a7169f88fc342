//! Post use cases: paginated listings, authoring and soft deletion.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageLimits, PageRequest};
use crate::application::repos::{PostListFilter, PostsRepo};
use crate::domain::entities::{PostRecord, stored_now};
use crate::domain::error::DomainError;
use crate::domain::slug::slug_or_derive;
use crate::domain::validation::{validate_content, validate_slug, validate_title};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginatePostOptions {
    pub user_id: Option<Uuid>,
    pub current_page: Option<u32>,
    pub posts_per_page: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub user_id: Uuid,
    pub title: String,
    /// Derived from the title when blank.
    pub slug: String,
    pub content: String,
    pub is_published: bool,
}

#[derive(Debug, Clone)]
pub struct UpdatePostInput {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SoftDeletePostInput {
    pub user_id: Uuid,
    pub post_id: Uuid,
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostsRepo>,
    limits: PageLimits,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostsRepo>, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    pub async fn find(&self, id: Uuid) -> Result<PostRecord, AppError> {
        Ok(self.repo.find(id).await?)
    }

    /// Published posts, optionally narrowed to one author.
    pub async fn list_published(
        &self,
        options: PaginatePostOptions,
    ) -> Result<Page<PostRecord>, AppError> {
        let filter = match options.user_id {
            Some(owner) => PostListFilter::published_by(owner),
            None => PostListFilter::published(),
        };
        self.paginate(options, filter).await
    }

    /// Every live post of the requesting user, drafts included.
    pub async fn list_own(
        &self,
        user_id: Uuid,
        options: PaginatePostOptions,
    ) -> Result<Page<PostRecord>, AppError> {
        let options = PaginatePostOptions {
            user_id: Some(user_id),
            ..options
        };
        self.paginate(options, PostListFilter::owned_by(user_id))
            .await
    }

    async fn paginate(
        &self,
        options: PaginatePostOptions,
        filter: PostListFilter,
    ) -> Result<Page<PostRecord>, AppError> {
        let request = PageRequest::resolve(
            options.current_page,
            options.posts_per_page,
            options.user_id,
            self.limits,
        )?;

        let total = self.repo.count_posts(filter).await?;
        let items = self
            .repo
            .list_posts(filter, request.offset(), request.limit())
            .await?;

        debug!(
            target = "application::posts",
            page = request.current_page,
            page_size = request.page_size,
            total,
            returned = items.len(),
            "Paginated posts"
        );

        Ok(Page::assemble(&request, total, items))
    }

    pub async fn create(&self, input: CreatePostInput) -> Result<PostRecord, AppError> {
        let slug = resolve_post_fields(&input.title, &input.slug, &input.content)?;
        let now = stored_now();
        let published_at = input.is_published.then_some(now);

        let post = PostRecord::new(
            input.user_id,
            input.title,
            slug,
            input.content,
            published_at,
            now,
        );
        self.repo.create(&post).await?;

        info!(
            target = "application::posts",
            post_id = %post.id,
            user_id = %post.user_id,
            published = post.is_published(),
            "Created post"
        );
        Ok(post)
    }

    pub async fn update(&self, input: UpdatePostInput) -> Result<PostRecord, AppError> {
        let slug = resolve_post_fields(&input.title, &input.slug, &input.content)?;
        let mut post = self.repo.find_owned(input.id, input.user_id).await?;
        let now = stored_now();

        post.title = input.title;
        post.slug = slug;
        post.content = input.content;
        post.published_at = match (input.is_published, post.published_at) {
            (true, Some(existing)) => Some(existing),
            (true, None) => Some(now),
            (false, _) => None,
        };
        post.touch(now);

        self.repo.update(&post).await?;
        Ok(post)
    }

    /// Publishing an already published post keeps its original timestamp.
    pub async fn publish(&self, id: Uuid, user_id: Uuid) -> Result<PostRecord, AppError> {
        let mut post = self.repo.find_owned(id, user_id).await?;
        let now = stored_now();

        if post.published_at.is_none() {
            post.published_at = Some(now);
        }
        post.touch(now);

        self.repo.publish(&post).await?;
        info!(
            target = "application::posts",
            post_id = %post.id,
            "Published post"
        );
        Ok(post)
    }

    pub async fn soft_delete(&self, input: SoftDeletePostInput) -> Result<(), AppError> {
        let mut post = self.repo.find_owned(input.post_id, input.user_id).await?;
        let now = stored_now();

        post.mark_deleted(now);
        post.touch(now);

        self.repo.soft_delete(&post).await?;
        info!(
            target = "application::posts",
            post_id = %post.id,
            "Soft-deleted post"
        );
        Ok(())
    }
}

/// Validate author-supplied fields and return the slug to store.
fn resolve_post_fields(title: &str, slug: &str, content: &str) -> Result<String, AppError> {
    validate_title(title)?;
    validate_content(content)?;
    let slug = slug_or_derive(slug, title).map_err(DomainError::from)?;
    validate_slug(&slug)?;
    Ok(slug)
}
