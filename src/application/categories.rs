use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CategoriesRepo, CreateCategoryParams, RepoError};
use crate::domain::entities::{CategoryRecord, UserRecord};
use crate::domain::slug::{SlugAsyncError, generate_unique_slug_async, normalize_slug};

const ADMIN_ONLY: &str = "Admin access required";

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Category is still used by courses or blog posts")]
    InUse,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<SlugAsyncError<RepoError>> for CategoryError {
    fn from(err: SlugAsyncError<RepoError>) -> Self {
        match err {
            SlugAsyncError::Slug(slug) => Self::Validation(slug.to_string()),
            SlugAsyncError::Predicate(repo) => Self::Repo(repo),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub name_en: Option<String>,
    pub name_fa: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCommand {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub name_fa: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoriesRepo>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoriesRepo>) -> Self {
        Self { repo }
    }

    pub async fn list_active(&self) -> Result<Vec<CategoryRecord>, CategoryError> {
        Ok(self.repo.list_categories(true).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryRecord, CategoryError> {
        self.repo
            .find_category(id)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    pub async fn create(
        &self,
        actor: &UserRecord,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, CategoryError> {
        if !actor.is_admin() {
            return Err(CategoryError::Forbidden(ADMIN_ONLY));
        }
        let name = required(&command.name, "name")?;
        let slug = self
            .unique_slug(command.slug.as_deref().unwrap_or(&name))
            .await?;

        let params = CreateCategoryParams {
            name_en: command.name_en.unwrap_or_else(|| name.clone()),
            name_fa: command.name_fa.unwrap_or_else(|| name.clone()),
            name,
            slug,
            description: command.description,
            icon: command.icon,
            color: command.color,
            is_active: command.is_active.unwrap_or(true),
        };
        let category = self.repo.create_category(params).await?;
        info!(
            target = "coursehub::categories",
            category_id = %category.id,
            slug = %category.slug,
            "category created"
        );
        Ok(category)
    }

    pub async fn update(
        &self,
        actor: &UserRecord,
        id: Uuid,
        command: UpdateCategoryCommand,
    ) -> Result<CategoryRecord, CategoryError> {
        if !actor.is_admin() {
            return Err(CategoryError::Forbidden(ADMIN_ONLY));
        }
        let mut category = self.get(id).await?;

        if let Some(name) = command.name {
            category.name = required(&name, "name")?;
        }
        if let Some(slug) = command.slug {
            let slug = normalize_slug(&slug)
                .ok_or_else(|| CategoryError::Validation("slug must not be empty".into()))?;
            if slug != category.slug {
                if self.repo.find_category_by_slug(&slug).await?.is_some() {
                    return Err(CategoryError::Validation(format!(
                        "Slug `{slug}` is already in use"
                    )));
                }
                category.slug = slug;
            }
        }
        if let Some(name_en) = command.name_en {
            category.name_en = name_en;
        }
        if let Some(name_fa) = command.name_fa {
            category.name_fa = name_fa;
        }
        if command.description.is_some() {
            category.description = command.description;
        }
        if command.icon.is_some() {
            category.icon = command.icon;
        }
        if command.color.is_some() {
            category.color = command.color;
        }
        if let Some(active) = command.is_active {
            category.is_active = active;
        }

        Ok(self.repo.update_category(&category).await?)
    }

    /// Delete an unused category.
    pub async fn delete(&self, actor: &UserRecord, id: Uuid) -> Result<(), CategoryError> {
        if !actor.is_admin() {
            return Err(CategoryError::Forbidden(ADMIN_ONLY));
        }
        self.get(id).await?;
        if self.repo.category_in_use(id).await? {
            return Err(CategoryError::InUse);
        }
        if !self.repo.delete_category(id).await? {
            return Err(CategoryError::NotFound);
        }
        info!(target = "coursehub::categories", category_id = %id, "category deleted");
        Ok(())
    }

    /// Insert the default catalogue categories when none exist yet.
    pub async fn seed_defaults(&self) -> Result<usize, CategoryError> {
        if !self.repo.list_categories(false).await?.is_empty() {
            return Ok(0);
        }
        let defaults = [
            (
                "Programming",
                "برنامه‌نویسی",
                "programming",
                "Learn programming languages and frameworks",
                "code",
                "#3b82f6",
            ),
            (
                "Business",
                "کسب و کار",
                "business",
                "Business and entrepreneurship courses",
                "briefcase",
                "#10b981",
            ),
            (
                "Design",
                "طراحی",
                "design",
                "UI/UX and graphic design courses",
                "palette",
                "#8b5cf6",
            ),
        ];
        for (name, name_fa, slug, description, icon, color) in defaults {
            self.repo
                .create_category(CreateCategoryParams {
                    name: name.to_string(),
                    name_en: name.to_string(),
                    name_fa: name_fa.to_string(),
                    slug: slug.to_string(),
                    description: Some(description.to_string()),
                    icon: Some(icon.to_string()),
                    color: Some(color.to_string()),
                    is_active: true,
                })
                .await?;
        }
        info!(
            target = "coursehub::categories",
            count = defaults.len(),
            "seeded default categories"
        );
        Ok(defaults.len())
    }

    async fn unique_slug(&self, source: &str) -> Result<String, CategoryError> {
        let repo = self.repo.clone();
        let slug = generate_unique_slug_async(source, "category", move |candidate| {
            let repo = repo.clone();
            let candidate = candidate.to_string();
            async move {
                repo.find_category_by_slug(&candidate)
                    .await
                    .map(|found| found.is_none())
            }
        })
        .await?;
        Ok(slug)
    }
}

fn required(value: &str, field: &str) -> Result<String, CategoryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
