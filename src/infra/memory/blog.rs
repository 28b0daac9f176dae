use std::collections::HashSet;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    BlogPostQueryFilter, BlogPostsRepo, CommentsRepo, CreateBlogPostParams, CreateCommentParams,
    RepoError, constraints,
};
use crate::domain::entities::{BlogPostRecord, CommentRecord};

use super::MemoryRepositories;
use super::lock::{read_table, write_table};
use super::page_slice;

#[async_trait]
impl BlogPostsRepo for MemoryRepositories {
    async fn list_blog_posts(
        &self,
        filter: &BlogPostQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<BlogPostRecord>, RepoError> {
        let posts = read_table(&self.blog_posts, "blog_posts");
        let mut rows: Vec<BlogPostRecord> = posts
            .iter()
            .rev()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_slice(rows.into_iter(), page))
    }

    async fn find_blog_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let posts = read_table(&self.blog_posts, "blog_posts");
        Ok(posts.iter().find(|post| post.id == id).cloned())
    }

    async fn find_blog_post_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPostRecord>, RepoError> {
        let posts = read_table(&self.blog_posts, "blog_posts");
        Ok(posts.iter().find(|post| post.slug == slug).cloned())
    }

    async fn create_blog_post(
        &self,
        params: CreateBlogPostParams,
    ) -> Result<BlogPostRecord, RepoError> {
        let mut posts = write_table(&self.blog_posts, "blog_posts");
        if posts.iter().any(|post| post.slug == params.slug) {
            return Err(RepoError::duplicate(constraints::BLOG_POSTS_SLUG));
        }
        let now = OffsetDateTime::now_utc();
        let post = BlogPostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            title_en: params.title_en,
            title_fa: params.title_fa,
            slug: params.slug,
            excerpt: params.excerpt,
            content: params.content,
            thumbnail: params.thumbnail,
            author_id: params.author_id,
            category_id: params.category_id,
            tags: params.tags,
            is_published: params.is_published,
            is_featured: params.is_featured,
            views_count: 0,
            published_at: params.published_at,
            created_at: now,
            updated_at: now,
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn update_blog_post(&self, post: &BlogPostRecord) -> Result<BlogPostRecord, RepoError> {
        let mut posts = write_table(&self.blog_posts, "blog_posts");
        if posts
            .iter()
            .any(|other| other.id != post.id && other.slug == post.slug)
        {
            return Err(RepoError::duplicate(constraints::BLOG_POSTS_SLUG));
        }
        let slot = posts
            .iter_mut()
            .find(|row| row.id == post.id)
            .ok_or(RepoError::NotFound)?;
        let mut updated = post.clone();
        updated.views_count = slot.views_count;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_blog_post(&self, id: Uuid) -> Result<bool, RepoError> {
        {
            let mut posts = write_table(&self.blog_posts, "blog_posts");
            let before = posts.len();
            posts.retain(|post| post.id != id);
            if posts.len() == before {
                return Ok(false);
            }
        }
        write_table(&self.comments, "comments").retain(|comment| comment.blog_post_id != id);
        Ok(true)
    }

    async fn record_blog_view(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let mut posts = write_table(&self.blog_posts, "blog_posts");
        Ok(posts.iter_mut().find(|post| post.id == id).map(|post| {
            post.views_count = post.views_count.saturating_add(1);
            post.clone()
        }))
    }
}

#[async_trait]
impl CommentsRepo for MemoryRepositories {
    async fn list_comments_for_post(
        &self,
        blog_post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let comments = read_table(&self.comments, "comments");
        let mut rows: Vec<CommentRecord> = comments
            .iter()
            .filter(|comment| comment.blog_post_id == blog_post_id && comment.is_published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        let comments = read_table(&self.comments, "comments");
        Ok(comments.iter().find(|comment| comment.id == id).cloned())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            content: params.content,
            user_id: params.user_id,
            blog_post_id: params.blog_post_id,
            parent_id: params.parent_id,
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        write_table(&self.comments, "comments").push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut comments = write_table(&self.comments, "comments");
        if !comments.iter().any(|comment| comment.id == id) {
            return Ok(false);
        }

        let mut doomed: HashSet<Uuid> = HashSet::from([id]);
        loop {
            let before = doomed.len();
            for comment in comments.iter() {
                if comment.parent_id.is_some_and(|parent| doomed.contains(&parent)) {
                    doomed.insert(comment.id);
                }
            }
            if doomed.len() == before {
                break;
            }
        }
        comments.retain(|comment| !doomed.contains(&comment.id));
        Ok(true)
    }
}

