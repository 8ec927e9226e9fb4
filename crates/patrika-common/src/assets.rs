//! Uploaded asset storage (editor images, featured images).

use miette::Diagnostic;
use smol_str::SmolStr;
use tracing::info;
use url::Url;

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum AssetError {
    #[error("empty upload for {0}")]
    Empty(String),

    #[error("asset backend error: {0}")]
    Backend(String),
}

/// Stores raw bytes and returns the public URL the editor embeds.
pub trait AssetStore {
    fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<Url, AssetError>;
}

/// In-memory asset store minting unique URLs under a base.
#[derive(Debug)]
pub struct MemoryAssetStore {
    base: Url,
    counter: u64,
    entries: Vec<(SmolStr, Vec<u8>)>,
}

impl MemoryAssetStore {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            counter: 0,
            entries: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b.as_slice())
    }
}

impl AssetStore for MemoryAssetStore {
    fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<Url, AssetError> {
        if bytes.is_empty() {
            return Err(AssetError::Empty(name.to_string()));
        }
        self.counter += 1;
        // Prefix keeps colliding client-side names distinct.
        let stored: SmolStr = format!("{}-{}", self.counter, sanitize_name(name)).into();
        let url = self
            .base
            .join(&stored)
            .map_err(|e| AssetError::Backend(e.to_string()))?;
        info!(name = %stored, size = bytes.len(), "asset uploaded");
        self.entries.push((stored, bytes.to_vec()));
        Ok(url)
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryAssetStore {
        MemoryAssetStore::new(Url::parse("https://assets.example.com/uploads/").unwrap())
    }

    #[test]
    fn test_upload_returns_public_url() {
        let mut store = store();
        let url = store.upload("pic.png", b"data").unwrap();
        assert_eq!(url.as_str(), "https://assets.example.com/uploads/1-pic.png");
        assert_eq!(store.get("1-pic.png"), Some(b"data".as_slice()));
    }

    #[test]
    fn test_same_name_gets_distinct_urls() {
        let mut store = store();
        let a = store.upload("pic.png", b"a").unwrap();
        let b = store.upload("pic.png", b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_name_is_sanitized() {
        let mut store = store();
        let url = store.upload("my photo (1).png", b"x").unwrap();
        assert!(url.as_str().ends_with("my_photo__1_.png"));
    }

    #[test]
    fn test_empty_upload_rejected() {
        let mut store = store();
        assert!(matches!(
            store.upload("x.png", b""),
            Err(AssetError::Empty(_))
        ));
    }
}
