use std::sync::Arc;

use newsarchive::{App, Archive, Commands, Config, NewsError, ResultOptions, SortBy};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: TempDir,
    archive: Arc<Mutex<Archive>>,
    app: App,
}

fn harness(base_url: &str, api_key: Option<&str>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        api_key: api_key.map(str::to_string),
        base_url: base_url.to_string(),
        archive_path: dir.path().join("saved_articles.json"),
        ..Config::default()
    };
    let archive = Arc::new(Mutex::new(Archive::open(&config.archive_path).unwrap()));
    let app = App::new(Arc::clone(&archive), config, false);
    Harness {
        _dir: dir,
        archive,
        app,
    }
}

fn search_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": { "id": null, "name": "Example Times" },
                "author": "Reporter",
                "title": "Birinci",
                "description": "first",
                "url": "https://example.com/1",
                "urlToImage": "https://example.com/1.png",
                "publishedAt": "2024-05-01T10:00:00Z",
                "content": "..."
            },
            {
                "source": { "id": "bbc-news", "name": "BBC News" },
                "author": null,
                "title": "İkinci",
                "description": null,
                "url": "https://example.com/2",
                "urlToImage": null,
                "publishedAt": "2024-05-02T11:00:00Z",
                "content": null
            }
        ]
    })
}

fn search(query: &str, save: Option<usize>) -> Commands {
    Commands::Search {
        query: query.to_string(),
        from: None,
        to: None,
        sort_by: SortBy::PublishedAt,
        output: ResultOptions { limit: 5, save },
    }
}

async fn mount_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/everything"))
        .and(query_param("q", "yapay zeka"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_with_save_stores_flattened_article() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    let h = harness(&server.uri(), Some("test-key"));

    h.app.run(search("yapay zeka", Some(2))).await.unwrap();

    let archive = h.archive.lock().await;
    assert_eq!(archive.len(), 1);
    let saved = archive.get_saved_article(1).unwrap();
    assert_eq!(
        serde_json::Value::Object(saved.fields.clone()),
        json!({
            "title": "İkinci",
            "url": "https://example.com/2",
            "source": "BBC News",
            "publishedAt": "2024-05-02T11:00:00Z",
            "description": null
        })
    );

    // the file on disk holds the same record
    let reloaded = Archive::open(archive.path()).unwrap();
    assert_eq!(reloaded.all_saved_articles(), archive.all_saved_articles());
}

#[tokio::test]
async fn save_number_out_of_range_is_rejected() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    let h = harness(&server.uri(), Some("test-key"));

    let err = h.app.run(search("yapay zeka", Some(3))).await.unwrap_err();
    assert!(matches!(err, NewsError::InvalidInput { .. }));
    assert!(h.archive.lock().await.is_empty());
}

#[tokio::test]
async fn failed_lookup_saves_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    let h = harness(&server.uri(), Some("test-key"));

    h.app.run(search("yapay zeka", Some(1))).await.unwrap();
    assert!(h.archive.lock().await.is_empty());
}

#[tokio::test]
async fn remote_command_without_key_is_a_config_error() {
    let h = harness("http://127.0.0.1:9", None);

    let err = h.app.run(search("x", None)).await.unwrap_err();
    assert!(matches!(err, NewsError::ConfigError { .. }));
}

#[tokio::test]
async fn headlines_save_uses_configured_country() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("country", "tr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server.uri(), Some("test-key"));

    h.app
        .run(Commands::Headlines {
            country: None,
            category: None,
            output: ResultOptions {
                limit: 1,
                save: Some(1),
            },
        })
        .await
        .unwrap();

    let archive = h.archive.lock().await;
    assert_eq!(
        archive.get_saved_article(1).unwrap().field_str("source"),
        Some("Example Times")
    );
}

#[tokio::test]
async fn update_applies_notes_and_json_assignments() {
    let h = harness("http://127.0.0.1:9", None);
    let id = h
        .archive
        .lock()
        .await
        .save_article(json!({ "title": "One" }).as_object().cloned().unwrap())
        .unwrap();

    h.app
        .run(Commands::Update {
            id,
            notes: Some("Bu makale çok ilginç!".to_string()),
            set: vec![
                "rating=4".to_string(),
                "tags=[\"ai\",\"tr\"]".to_string(),
                "comment=worth a read".to_string(),
                "id=99".to_string(),
            ],
        })
        .await
        .unwrap();

    let archive = h.archive.lock().await;
    let article = archive.get_saved_article(id).unwrap();
    assert_eq!(article.field_str("notes"), Some("Bu makale çok ilginç!"));
    assert_eq!(article.fields.get("rating"), Some(&json!(4)));
    assert_eq!(article.fields.get("tags"), Some(&json!(["ai", "tr"])));
    assert_eq!(article.field_str("comment"), Some("worth a read"));
    assert!(article.updated_date.is_some());
    assert!(archive.get_saved_article(99).is_none());
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let h = harness("http://127.0.0.1:9", None);

    let err = h
        .app
        .run(Commands::Update {
            id: 42,
            notes: Some("x".to_string()),
            set: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NewsError::ArticleNotFound { id: 42 }));
}

#[tokio::test]
async fn update_without_changes_is_rejected() {
    let h = harness("http://127.0.0.1:9", None);

    let err = h
        .app
        .run(Commands::Update {
            id: 1,
            notes: None,
            set: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NewsError::InvalidInput { .. }));
}

#[tokio::test]
async fn forced_delete_removes_article() {
    let h = harness("http://127.0.0.1:9", None);
    let id = h
        .archive
        .lock()
        .await
        .save_article(json!({ "title": "One" }).as_object().cloned().unwrap())
        .unwrap();

    h.app.run(Commands::Delete { id, force: true }).await.unwrap();
    assert!(h.archive.lock().await.is_empty());

    let err = h
        .app
        .run(Commands::Delete { id, force: true })
        .await
        .unwrap_err();
    assert!(matches!(err, NewsError::ArticleNotFound { .. }));
}

#[tokio::test]
async fn view_unknown_id_is_not_found() {
    let h = harness("http://127.0.0.1:9", None);

    let err = h
        .app
        .run(Commands::View { id: 7, json: true })
        .await
        .unwrap_err();
    assert!(matches!(err, NewsError::ArticleNotFound { id: 7 }));
}
