//! Read-only client for the headless CMS backing the blog.
//!
//! The blog is editorial content managed outside the forum; this client only
//! ever fetches published entries. Callers on page paths degrade to an empty
//! post list when the CMS is unreachable so the rest of the site stays up.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const CONTENT_TYPE: &str = "blogPost";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A published blog post, flattened from the CMS entry format.
#[derive(Debug, Clone)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// ISO 8601 date from the editorial calendar, not the entry's edit time.
    pub publication_date: String,
    pub excerpt: String,
    pub content: String,
    pub main_image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CmsClient {
    client: Client,
    base_url: String,
    space_id: String,
    access_token: String,
}

impl CmsClient {
    /// Create a client against a CMS delivery API.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, space_id: &str, access_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to create CMS HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            space_id: space_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// List published posts, newest publication date first, optionally
    /// narrowed by a full-text query.
    pub async fn list_posts(&self, query: Option<&str>) -> Result<Vec<BlogPost>> {
        let mut params = self.base_params();
        params.push(("order".to_string(), "-fields.publicationDate".to_string()));
        if let Some(q) = query {
            let q = q.trim();
            if !q.is_empty() {
                params.push(("query".to_string(), q.to_string()));
            }
        }

        self.fetch_entries(&params).await
    }

    /// Fetch a single post by its URL slug.
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let mut params = self.base_params();
        params.push(("fields.slug".to_string(), slug.to_string()));

        let posts = self.fetch_entries(&params).await?;
        Ok(posts.into_iter().next())
    }

    fn base_params(&self) -> Vec<(String, String)> {
        vec![
            ("access_token".to_string(), self.access_token.clone()),
            ("content_type".to_string(), CONTENT_TYPE.to_string()),
            // Depth 2 pulls linked image assets into the same response.
            ("include".to_string(), "2".to_string()),
        ]
    }

    async fn fetch_entries(&self, params: &[(String, String)]) -> Result<Vec<BlogPost>> {
        let url = format!(
            "{}/spaces/{}/environments/master/entries",
            self.base_url, self.space_id
        );

        debug!(url = %url, "Fetching CMS entries");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .context("Failed to reach CMS")?
            .error_for_status()
            .context("CMS returned an error status")?;

        let body: EntriesResponse = response
            .json()
            .await
            .context("Failed to parse CMS response")?;

        Ok(flatten_entries(body))
    }
}

// ---- Wire format ----

#[derive(Debug, Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    items: Vec<Entry>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(rename = "Asset", default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    sys: Sys,
    fields: EntryFields,
}

#[derive(Debug, Deserialize)]
struct Sys {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryFields {
    title: String,
    slug: String,
    #[serde(default)]
    publication_date: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    content: String,
    main_image: Option<AssetLink>,
}

#[derive(Debug, Deserialize)]
struct AssetLink {
    sys: AssetLinkSys,
}

#[derive(Debug, Deserialize)]
struct AssetLinkSys {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Asset {
    sys: Sys,
    fields: AssetFields,
}

#[derive(Debug, Deserialize)]
struct AssetFields {
    file: AssetFile,
}

#[derive(Debug, Deserialize)]
struct AssetFile {
    url: String,
}

fn flatten_entries(body: EntriesResponse) -> Vec<BlogPost> {
    let assets: HashMap<String, String> = body
        .includes
        .assets
        .into_iter()
        .map(|a| (a.sys.id, absolute_asset_url(&a.fields.file.url)))
        .collect();

    body.items
        .into_iter()
        .map(|entry| {
            let main_image_url = entry
                .fields
                .main_image
                .and_then(|link| assets.get(&link.sys.id).cloned());

            BlogPost {
                id: entry.sys.id,
                title: entry.fields.title,
                slug: entry.fields.slug,
                publication_date: entry.fields.publication_date,
                excerpt: entry.fields.excerpt,
                content: entry.fields.content,
                main_image_url,
            }
        })
        .collect()
}

/// Asset URLs come back protocol-relative from the delivery API.
fn absolute_asset_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_asset_url() {
        assert_eq!(
            absolute_asset_url("//images.example.net/cover.png"),
            "https://images.example.net/cover.png"
        );
        assert_eq!(
            absolute_asset_url("https://images.example.net/cover.png"),
            "https://images.example.net/cover.png"
        );
    }

    #[test]
    fn test_flatten_resolves_main_image() {
        let body: EntriesResponse = serde_json::from_value(serde_json::json!({
            "items": [{
                "sys": {"id": "post1"},
                "fields": {
                    "title": "CRT shopping guide",
                    "slug": "crt-shopping-guide",
                    "publicationDate": "2024-03-01",
                    "excerpt": "What to look for.",
                    "content": "Long form body.",
                    "mainImage": {"sys": {"id": "img1"}}
                }
            }],
            "includes": {
                "Asset": [{
                    "sys": {"id": "img1"},
                    "fields": {"file": {"url": "//images.example.net/crt.jpg"}}
                }]
            }
        }))
        .unwrap();

        let posts = flatten_entries(body);
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].main_image_url.as_deref(),
            Some("https://images.example.net/crt.jpg")
        );
    }

    #[test]
    fn test_flatten_missing_image_and_includes() {
        let body: EntriesResponse = serde_json::from_value(serde_json::json!({
            "items": [{
                "sys": {"id": "post2"},
                "fields": {
                    "title": "Untitled",
                    "slug": "untitled",
                    "publicationDate": "2024-01-15"
                }
            }]
        }))
        .unwrap();

        let posts = flatten_entries(body);
        assert_eq!(posts.len(), 1);
        assert!(posts[0].main_image_url.is_none());
        assert!(posts[0].content.is_empty());
    }
}
