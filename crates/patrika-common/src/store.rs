//! Article persistence.

use miette::Diagnostic;
use tracing::info;

use crate::article::{Article, ArticlePatch, NewArticle};

/// Storage-layer failures.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum StoreError {
    #[error("article {0} not found")]
    NotFound(i64),

    #[error("article {0} already exists")]
    Duplicate(i64),

    /// Backend-specific failure (network, disk, remote service).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// CRUD over articles. Listings come back newest first.
pub trait ArticleStore {
    fn create(&mut self, new: NewArticle) -> Result<Article, StoreError>;

    fn update(&mut self, id: i64, patch: ArticlePatch) -> Result<Article, StoreError>;

    fn delete(&mut self, id: i64) -> Result<(), StoreError>;

    fn get(&self, id: i64) -> Result<Article, StoreError>;

    fn list(&self) -> Result<Vec<Article>, StoreError>;
}

/// In-memory store, used by tests and offline drafting.
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArticleStore for MemoryStore {
    fn create(&mut self, new: NewArticle) -> Result<Article, StoreError> {
        self.next_id += 1;
        let read_time = crate::article::read_time_for_markup(&new.content);
        let article = Article {
            id: self.next_id,
            title: new.title,
            excerpt: new.excerpt,
            content: new.content,
            date: new.date,
            category: new.category,
            read_time,
            tags: new.tags,
            featured_image: new.featured_image,
            views: 0,
            author_name: new.author_name,
            author_role: new.author_role,
            author_avatar: new.author_avatar,
            title_ne: new.title_ne,
            excerpt_ne: new.excerpt_ne,
            content_ne: new.content_ne,
            tags_ne: new.tags_ne,
        };
        info!(id = article.id, title = %article.title, "article created");
        self.articles.push(article.clone());
        Ok(article)
    }

    fn update(&mut self, id: i64, patch: ArticlePatch) -> Result<Article, StoreError> {
        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if let Some(title) = patch.title {
            article.title = title;
        }
        if let Some(excerpt) = patch.excerpt {
            article.excerpt = excerpt;
        }
        if let Some(content) = patch.content {
            article.read_time = crate::article::read_time_for_markup(&content);
            article.content = content;
        }
        if let Some(date) = patch.date {
            article.date = date;
        }
        if let Some(category) = patch.category {
            article.category = category;
        }
        if let Some(tags) = patch.tags {
            article.tags = tags;
        }
        if let Some(featured_image) = patch.featured_image {
            article.featured_image = featured_image;
        }
        if let Some(title_ne) = patch.title_ne {
            article.title_ne = Some(title_ne);
        }
        if let Some(excerpt_ne) = patch.excerpt_ne {
            article.excerpt_ne = Some(excerpt_ne);
        }
        if let Some(content_ne) = patch.content_ne {
            article.content_ne = Some(content_ne);
        }
        if let Some(tags_ne) = patch.tags_ne {
            article.tags_ne = tags_ne;
        }
        Ok(article.clone())
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.articles.len();
        self.articles.retain(|a| a.id != id);
        if self.articles.len() == before {
            return Err(StoreError::NotFound(id));
        }
        info!(id, "article deleted");
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Article, StoreError> {
        self.articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<Article>, StoreError> {
        let mut out = self.articles.clone();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }
}
