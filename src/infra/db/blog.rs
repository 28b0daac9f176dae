use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    BlogPostQueryFilter, BlogPostsRepo, CommentsRepo, CreateBlogPostParams, CreateCommentParams,
    RepoError,
};
use crate::domain::entities::{BlogPostRecord, CommentRecord};

use super::PostgresRepositories;
use super::catalog::escape_like;
use super::util::map_sqlx_error;

const POST_COLUMNS: &str = "id, title, title_en, title_fa, slug, excerpt, content, thumbnail, \
    author_id, category_id, tags, is_published, is_featured, views_count, published_at, \
    created_at, updated_at";

const COMMENT_COLUMNS: &str =
    "id, content, user_id, blog_post_id, parent_id, is_published, created_at, updated_at";

impl PostgresRepositories {
    fn apply_blog_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q BlogPostQueryFilter) {
        if let Some(author_id) = filter.author_id {
            qb.push(" AND author_id = ");
            qb.push_bind(author_id);
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ");
            qb.push_bind(category_id);
        }
        if let Some(published) = filter.is_published {
            qb.push(" AND is_published = ");
            qb.push_bind(published);
        }
        if let Some(featured) = filter.is_featured {
            qb.push(" AND is_featured = ");
            qb.push_bind(featured);
        }
        if let Some(search) = filter.search.as_ref() {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR content ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
    }
}

#[async_trait]
impl BlogPostsRepo for PostgresRepositories {
    async fn list_blog_posts(
        &self,
        filter: &BlogPostQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<BlogPostRecord>, RepoError> {
        let mut qb =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE TRUE"));
        Self::apply_blog_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(page.sql_limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.sql_offset());

        qb.build_query_as::<BlogPostRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_blog_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1");
        sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_blog_post_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1");
        sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_blog_post(
        &self,
        params: CreateBlogPostParams,
    ) -> Result<BlogPostRecord, RepoError> {
        let sql = format!(
            "INSERT INTO blog_posts (id, title, title_en, title_fa, slug, excerpt, content, \
                 thumbnail, author_id, category_id, tags, is_published, is_featured, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.title)
            .bind(params.title_en)
            .bind(params.title_fa)
            .bind(params.slug)
            .bind(params.excerpt)
            .bind(params.content)
            .bind(params.thumbnail)
            .bind(params.author_id)
            .bind(params.category_id)
            .bind(Json(params.tags))
            .bind(params.is_published)
            .bind(params.is_featured)
            .bind(params.published_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_blog_post(&self, post: &BlogPostRecord) -> Result<BlogPostRecord, RepoError> {
        let sql = format!(
            "UPDATE blog_posts SET title = $2, title_en = $3, title_fa = $4, slug = $5, \
                 excerpt = $6, content = $7, thumbnail = $8, category_id = $9, tags = $10, \
                 is_published = $11, is_featured = $12, published_at = $13, updated_at = $14 \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(post.id)
            .bind(&post.title)
            .bind(&post.title_en)
            .bind(&post.title_fa)
            .bind(&post.slug)
            .bind(&post.excerpt)
            .bind(&post.content)
            .bind(&post.thumbnail)
            .bind(post.category_id)
            .bind(Json(&post.tags))
            .bind(post.is_published)
            .bind(post.is_featured)
            .bind(post.published_at)
            .bind(post.updated_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_blog_post(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_blog_view(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let sql = format!(
            "UPDATE blog_posts SET views_count = views_count + 1 WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn list_comments_for_post(
        &self,
        blog_post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE blog_post_id = $1 AND is_published \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(blog_post_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let sql = format!(
            "INSERT INTO comments (id, content, user_id, blog_post_id, parent_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.content)
            .bind(params.user_id)
            .bind(params.blog_post_id)
            .bind(params.parent_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, RepoError> {
        // Replies follow through the self-referencing ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
