use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    BlogPostQueryFilter, BlogPostsRepo, CategoriesRepo, CommentsRepo, CreateBlogPostParams,
    CreateCommentParams, RepoError, UsersRepo,
};
use crate::domain::entities::{BlogPostRecord, CommentRecord, PublicProfile, UserRecord};
use crate::domain::slug::{SlugAsyncError, generate_unique_slug_async, normalize_slug};

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("Blog post not found")]
    NotFound,
    #[error("Comment not found")]
    CommentNotFound,
    #[error("Category not found")]
    CategoryNotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<SlugAsyncError<RepoError>> for BlogError {
    fn from(err: SlugAsyncError<RepoError>) -> Self {
        match err {
            SlugAsyncError::Slug(slug) => Self::Validation(slug.to_string()),
            SlugAsyncError::Predicate(repo) => Self::Repo(repo),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateBlogPostCommand {
    pub title: String,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub thumbnail: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBlogPostCommand {
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentCommand {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: CommentRecord,
    pub user: Option<PublicProfile>,
}

/// A post as shown on its own page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostDetail {
    #[serde(flatten)]
    pub post: BlogPostRecord,
    pub author: Option<PublicProfile>,
    pub comments: Vec<CommentView>,
}

#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn BlogPostsRepo>,
    comments: Arc<dyn CommentsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    users: Arc<dyn UsersRepo>,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn BlogPostsRepo>,
        comments: Arc<dyn CommentsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        users: Arc<dyn UsersRepo>,
    ) -> Self {
        Self {
            posts,
            comments,
            categories,
            users,
        }
    }

    /// Drafts are only listed for admins.
    pub async fn list(
        &self,
        viewer: Option<&UserRecord>,
        mut filter: BlogPostQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<BlogPostRecord>, BlogError> {
        if !viewer.is_some_and(UserRecord::is_admin) {
            filter.is_published = Some(true);
        }
        Ok(self.posts.list_blog_posts(&filter, page).await?)
    }

    /// Load a post for reading and count the view.
    pub async fn read(
        &self,
        viewer: Option<&UserRecord>,
        id: Uuid,
    ) -> Result<BlogPostDetail, BlogError> {
        let post = self.visible_post(viewer, id).await?;
        let post = self
            .posts
            .record_blog_view(post.id)
            .await?
            .ok_or(BlogError::NotFound)?;

        let author = self
            .users
            .find_user(post.author_id)
            .await?
            .map(|user| PublicProfile::from(&user));
        let comments = self.comments.list_comments_for_post(post.id).await?;
        let comments = self.attach_commenters(comments).await?;
        Ok(BlogPostDetail {
            post,
            author,
            comments,
        })
    }

    pub async fn create(
        &self,
        actor: &UserRecord,
        command: CreateBlogPostCommand,
    ) -> Result<BlogPostRecord, BlogError> {
        if !actor.is_admin() {
            return Err(BlogError::Forbidden("Only admins can create blog posts"));
        }
        let title = required(&command.title, "title")?;
        let content = required(&command.content, "content")?;
        if let Some(category_id) = command.category_id {
            self.ensure_category(category_id).await?;
        }
        let slug = self
            .unique_slug(command.slug.as_deref().unwrap_or(&title))
            .await?;
        let is_published = command.is_published.unwrap_or(false);

        let post = self
            .posts
            .create_blog_post(CreateBlogPostParams {
                title,
                title_en: command.title_en,
                title_fa: command.title_fa,
                slug,
                excerpt: command.excerpt,
                content,
                thumbnail: command.thumbnail,
                author_id: actor.id,
                category_id: command.category_id,
                tags: command.tags,
                is_published,
                is_featured: command.is_featured.unwrap_or(false),
                published_at: is_published.then(OffsetDateTime::now_utc),
            })
            .await?;
        info!(
            target = "coursehub::blog",
            post_id = %post.id,
            slug = %post.slug,
            is_published = post.is_published,
            "blog post created"
        );
        Ok(post)
    }

    pub async fn update(
        &self,
        actor: &UserRecord,
        id: Uuid,
        command: UpdateBlogPostCommand,
    ) -> Result<BlogPostRecord, BlogError> {
        if !actor.is_admin() {
            return Err(BlogError::Forbidden("Only admins can update blog posts"));
        }
        let mut post = self.get(id).await?;
        let now = OffsetDateTime::now_utc();

        if let Some(title) = command.title {
            post.title = required(&title, "title")?;
        }
        if let Some(content) = command.content {
            post.content = required(&content, "content")?;
        }
        if let Some(slug) = command.slug {
            let slug = normalize_slug(&slug)
                .ok_or_else(|| BlogError::Validation("slug must not be empty".into()))?;
            if slug != post.slug && self.posts.find_blog_post_by_slug(&slug).await?.is_some() {
                return Err(BlogError::Validation(format!(
                    "Slug `{slug}` is already in use"
                )));
            }
            post.slug = slug;
        }
        if let Some(category_id) = command.category_id {
            self.ensure_category(category_id).await?;
            post.category_id = Some(category_id);
        }
        if command.title_en.is_some() {
            post.title_en = command.title_en;
        }
        if command.title_fa.is_some() {
            post.title_fa = command.title_fa;
        }
        if command.excerpt.is_some() {
            post.excerpt = command.excerpt;
        }
        if command.thumbnail.is_some() {
            post.thumbnail = command.thumbnail;
        }
        if let Some(tags) = command.tags {
            post.tags = tags;
        }
        if let Some(featured) = command.is_featured {
            post.is_featured = featured;
        }
        if let Some(published) = command.is_published {
            post.is_published = published;
            if published && post.published_at.is_none() {
                post.published_at = Some(now);
            }
        }
        post.updated_at = now;

        Ok(self.posts.update_blog_post(&post).await?)
    }

    /// Delete a post and its comments.
    pub async fn delete(&self, actor: &UserRecord, id: Uuid) -> Result<(), BlogError> {
        if !actor.is_admin() {
            return Err(BlogError::Forbidden("Only admins can delete blog posts"));
        }
        if !self.posts.delete_blog_post(id).await? {
            return Err(BlogError::NotFound);
        }
        info!(target = "coursehub::blog", post_id = %id, "blog post deleted");
        Ok(())
    }

    pub async fn add_comment(
        &self,
        actor: &UserRecord,
        post_id: Uuid,
        command: CreateCommentCommand,
    ) -> Result<CommentView, BlogError> {
        let post = self.visible_post(Some(actor), post_id).await?;
        let content = required(&command.content, "content")?;
        if let Some(parent_id) = command.parent_id {
            let parent = self
                .comments
                .find_comment(parent_id)
                .await?
                .ok_or(BlogError::CommentNotFound)?;
            if parent.blog_post_id != post.id {
                return Err(BlogError::Validation(
                    "Parent comment must belong to the same post".to_string(),
                ));
            }
        }

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                content,
                user_id: actor.id,
                blog_post_id: post.id,
                parent_id: command.parent_id,
            })
            .await?;
        info!(
            target = "coursehub::blog",
            comment_id = %comment.id,
            post_id = %post.id,
            "comment added"
        );
        Ok(CommentView {
            comment,
            user: Some(PublicProfile::from(actor)),
        })
    }

    /// Delete a comment with all of its replies.
    pub async fn delete_comment(&self, actor: &UserRecord, id: Uuid) -> Result<(), BlogError> {
        let comment = self
            .comments
            .find_comment(id)
            .await?
            .ok_or(BlogError::CommentNotFound)?;
        if !actor.owns_or_admin(comment.user_id) {
            return Err(BlogError::Forbidden("Not authorized to delete this comment"));
        }
        if !self.comments.delete_comment(id).await? {
            return Err(BlogError::CommentNotFound);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<BlogPostRecord, BlogError> {
        self.posts
            .find_blog_post(id)
            .await?
            .ok_or(BlogError::NotFound)
    }

    async fn visible_post(
        &self,
        viewer: Option<&UserRecord>,
        id: Uuid,
    ) -> Result<BlogPostRecord, BlogError> {
        let post = self.get(id).await?;
        if post.is_published || viewer.is_some_and(UserRecord::is_admin) {
            Ok(post)
        } else {
            Err(BlogError::NotFound)
        }
    }

    async fn attach_commenters(
        &self,
        comments: Vec<CommentRecord>,
    ) -> Result<Vec<CommentView>, BlogError> {
        let mut profiles: HashMap<Uuid, Option<PublicProfile>> = HashMap::new();
        let mut views = Vec::with_capacity(comments.len());
        for comment in comments {
            if !profiles.contains_key(&comment.user_id) {
                let profile = self
                    .users
                    .find_user(comment.user_id)
                    .await?
                    .map(|user| PublicProfile::from(&user));
                profiles.insert(comment.user_id, profile);
            }
            let user = profiles.get(&comment.user_id).cloned().flatten();
            views.push(CommentView { comment, user });
        }
        Ok(views)
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), BlogError> {
        match self.categories.find_category(id).await? {
            Some(_) => Ok(()),
            None => Err(BlogError::CategoryNotFound),
        }
    }

    async fn unique_slug(&self, source: &str) -> Result<String, BlogError> {
        let repo = self.posts.clone();
        let slug = generate_unique_slug_async(source, "post", move |candidate| {
            let repo = repo.clone();
            let candidate = candidate.to_string();
            async move {
                repo.find_blog_post_by_slug(&candidate)
                    .await
                    .map(|found| found.is_none())
            }
        })
        .await?;
        Ok(slug)
    }
}

fn required(value: &str, field: &str) -> Result<String, BlogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BlogError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
