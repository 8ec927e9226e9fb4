//! The article model shared by the editing surface and the storage layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

/// Publication sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    History,
    Technology,
    #[serde(rename = "Political Issues")]
    PoliticalIssues,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::History => "History",
            Category::Technology => "Technology",
            Category::PoliticalIssues => "Political Issues",
        }
    }
}

/// Social profile links shown on the author card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Socials {
    #[serde(default)]
    pub twitter: Option<Url>,
    #[serde(default)]
    pub facebook: Option<Url>,
    #[serde(default)]
    pub instagram: Option<Url>,
}

/// The site's author profile. Articles may override name, role, and avatar
/// per entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar: Option<Url>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub socials: Socials,
}

/// A published or draft article. The `_ne` fields hold the
/// secondary-language rendition of the authored fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    /// Canonical markup produced by the editor.
    pub content: String,
    pub date: NaiveDate,
    pub category: Category,
    /// Reading-time label, e.g. "5 min read".
    pub read_time: String,
    #[serde(default)]
    pub tags: Vec<SmolStr>,
    #[serde(default)]
    pub featured_image: Option<Url>,
    #[serde(default)]
    pub views: u64,
    pub author_name: String,
    #[serde(default)]
    pub author_role: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<Url>,
    #[serde(default)]
    pub title_ne: Option<String>,
    #[serde(default)]
    pub excerpt_ne: Option<String>,
    #[serde(default)]
    pub content_ne: Option<String>,
    #[serde(default)]
    pub tags_ne: Vec<SmolStr>,
}

/// Fields required to create an article; the store assigns the rest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub date: NaiveDate,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<SmolStr>,
    #[serde(default)]
    pub featured_image: Option<Url>,
    pub author_name: String,
    #[serde(default)]
    pub author_role: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<Url>,
    #[serde(default)]
    pub title_ne: Option<String>,
    #[serde(default)]
    pub excerpt_ne: Option<String>,
    #[serde(default)]
    pub content_ne: Option<String>,
    #[serde(default)]
    pub tags_ne: Vec<SmolStr>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub date: Option<NaiveDate>,
    pub category: Option<Category>,
    pub tags: Option<Vec<SmolStr>>,
    pub featured_image: Option<Option<Url>>,
    pub title_ne: Option<String>,
    pub excerpt_ne: Option<String>,
    pub content_ne: Option<String>,
    pub tags_ne: Option<Vec<SmolStr>>,
}

const WORDS_PER_MINUTE: usize = 200;

/// Reading-time label from visible text, at 200 words per minute, never
/// less than one minute.
pub fn estimate_read_time(plain_text: &str) -> String {
    let words = plain_text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// Reading-time label for stored article markup. Tags and style attributes
/// carry no reading weight, so the markup is reduced to visible text first.
pub fn read_time_for_markup(markup: &str) -> String {
    estimate_read_time(&patrika_editor_core::markup::parse(markup).plain_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_rename() {
        let json = serde_json::to_string(&Category::PoliticalIssues).unwrap();
        assert_eq!(json, "\"Political Issues\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::PoliticalIssues);
    }

    #[test]
    fn test_read_time_minimum_one_minute() {
        assert_eq!(estimate_read_time(""), "1 min read");
        assert_eq!(estimate_read_time("short note"), "1 min read");
    }

    #[test]
    fn test_read_time_rounds_up() {
        let text = vec!["word"; 201].join(" ");
        assert_eq!(estimate_read_time(&text), "2 min read");
    }

    #[test]
    fn test_read_time_for_markup_counts_only_visible_words() {
        // 150 visible words, each wrapped in a styled span. Counting the
        // raw markup would see several tokens per word and report minutes.
        let word = "<span style=\"color: #ff0000\">word</span> ";
        let heavy = format!("<p>{}</p>", word.repeat(150));
        assert_eq!(read_time_for_markup(&heavy), "1 min read");

        let markup = format!("<p>{}</p>", vec!["word"; 201].join(" "));
        assert_eq!(read_time_for_markup(&markup), "2 min read");
    }

    #[test]
    fn test_article_deserializes_without_optional_fields() {
        let json = r#"{
            "id": 1,
            "title": "T",
            "excerpt": "E",
            "content": "<p>c</p>",
            "date": "2025-01-15",
            "category": "History",
            "read_time": "3 min read",
            "author_name": "A"
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.tags.is_empty());
        assert!(article.title_ne.is_none());
        assert_eq!(article.views, 0);
    }
}
