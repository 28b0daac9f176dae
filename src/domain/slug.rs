//! URL slugs for courses, categories and blog posts.
//!
//! Titles are slugified with the `slug` crate (which transliterates non-Latin
//! scripts). Uniqueness is checked by an async predicate so the store decides
//! what already exists; collisions get a numeric suffix (`-2`, `-3`, ...).

use std::future::Future;

use slug::slugify;
use thiserror::Error;
use uuid::Uuid;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from human-readable text.
///
/// Text that slugifies to nothing (punctuation only, for example) falls back
/// to `{fallback}-{short id}` so every record still gets an addressable slug.
pub fn derive_slug(input: &str, fallback: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        let short = Uuid::new_v4().simple().to_string();
        return Ok(format!("{fallback}-{}", &short[..8]));
    }

    Ok(candidate)
}

/// Normalise a caller-supplied slug; returns `None` when nothing usable remains.
pub fn normalize_slug(input: &str) -> Option<String> {
    let candidate = slugify(input);
    (!candidate.is_empty()).then_some(candidate)
}

/// Produce a slug for `input` that the `is_unique` predicate accepts.
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    fallback: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input, fallback)?;

    if is_unique(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[test]
    fn derive_slug_lowercases_and_hyphenates() {
        let slug = derive_slug("Rust for Web Developers!", "course").expect("slug");
        assert_eq!(slug, "rust-for-web-developers");
    }

    #[test]
    fn derive_slug_falls_back_for_symbols() {
        let slug = derive_slug("!!!", "course").expect("slug");
        assert!(slug.starts_with("course-"));
        assert_eq!(slug.len(), "course-".len() + 8);
    }

    #[test]
    fn derive_slug_rejects_blank_input() {
        assert_eq!(derive_slug("   ", "course"), Err(SlugError::EmptyInput));
    }

    #[test]
    fn normalize_slug_cleans_user_input() {
        assert_eq!(normalize_slug("My Course"), Some("my-course".to_string()));
        assert_eq!(normalize_slug("--"), None);
    }

    #[tokio::test]
    async fn unique_slug_appends_counter() {
        let existing = Arc::new(Mutex::new(vec!["intro-to-go".to_string()]));

        let slug = generate_unique_slug_async("Intro to Go", "course", |candidate| {
            let existing = existing.clone();
            let candidate = candidate.to_string();
            async move {
                let mut guard = existing.lock().await;
                if guard.contains(&candidate) {
                    Ok::<bool, Infallible>(false)
                } else {
                    guard.push(candidate);
                    Ok(true)
                }
            }
        })
        .await
        .expect("unique slug");

        assert_eq!(slug, "intro-to-go-2");
    }

    #[tokio::test]
    async fn unique_slug_gives_up_eventually() {
        let result =
            generate_unique_slug_async("Busy", "post", |_| async { Ok::<bool, Infallible>(false) })
                .await;
        assert!(matches!(
            result,
            Err(SlugAsyncError::Slug(SlugError::Exhausted { .. }))
        ));
    }
}
