//! Integration tests for the CMS client against a mock delivery API.

use retro_forum::cms::CmsClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn entries_body() -> serde_json::Value {
    json!({
        "items": [
            {
                "sys": {"id": "post-a"},
                "fields": {
                    "title": "Region-free mods explained",
                    "slug": "region-free-mods",
                    "publicationDate": "2024-03-05",
                    "excerpt": "Play imports on anything.",
                    "content": "Long form body.",
                    "mainImage": {"sys": {"id": "asset-1"}}
                }
            },
            {
                "sys": {"id": "post-b"},
                "fields": {
                    "title": "CIB grading basics",
                    "slug": "cib-grading-basics",
                    "publicationDate": "2024-02-10",
                    "excerpt": "What complete really means.",
                    "content": "Another body."
                }
            }
        ],
        "includes": {
            "Asset": [
                {
                    "sys": {"id": "asset-1"},
                    "fields": {"file": {"url": "//images.example.net/mods.jpg"}}
                }
            ]
        }
    })
}

#[tokio::test]
async fn test_list_posts_flattens_entries_and_assets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spaces/space1/environments/master/entries"))
        .and(query_param("content_type", "blogPost"))
        .and(query_param("access_token", "token1"))
        .and(query_param("order", "-fields.publicationDate"))
        .and(query_param("include", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries_body()))
        .mount(&server)
        .await;

    let client = CmsClient::new(&server.uri(), "space1", "token1").unwrap();
    let posts = client.list_posts(None).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].slug, "region-free-mods");
    assert_eq!(
        posts[0].main_image_url.as_deref(),
        Some("https://images.example.net/mods.jpg")
    );
    assert!(posts[1].main_image_url.is_none());
}

#[tokio::test]
async fn test_list_posts_passes_search_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spaces/space1/environments/master/entries"))
        .and(query_param("query", "mods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CmsClient::new(&server.uri(), "space1", "token1").unwrap();
    let posts = client.list_posts(Some("mods")).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_get_post_by_slug_filters_server_side() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spaces/space1/environments/master/entries"))
        .and(query_param("fields.slug", "region-free-mods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries_body()))
        .mount(&server)
        .await;

    let client = CmsClient::new(&server.uri(), "space1", "token1").unwrap();
    let post = client
        .get_post_by_slug("region-free-mods")
        .await
        .unwrap()
        .expect("post should be found");
    assert_eq!(post.title, "Region-free mods explained");
}

#[tokio::test]
async fn test_missing_slug_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spaces/space1/environments/master/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = CmsClient::new(&server.uri(), "space1", "token1").unwrap();
    assert!(client.get_post_by_slug("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_surfaces_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = CmsClient::new(&server.uri(), "space1", "token1").unwrap();
    assert!(client.list_posts(None).await.is_err());
}
