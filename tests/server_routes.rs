// Router tests: drive the axum app in-process with tower's oneshot

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

use letterbox::config::ArchiveConfig;
use letterbox::server::{router, AppState};
use letterbox::Letterbox;

fn write_letter(dir: &Path, name: &str, content: &str) {
    let letters = dir.join("letters");
    fs::create_dir_all(&letters).unwrap();
    fs::write(letters.join(name), content).unwrap();
}

fn seeded_site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_letter(
        dir.path(),
        "2023-01-spring-update.md",
        "---\nsubject: Spring Update\npublish_date: 2023-01-15\n---\n<p>Hello</p>\n",
    );
    write_letter(
        dir.path(),
        "2022-11-autumn.md",
        "---\nsubject: Autumn <Notes>\npublish_date: 2022-11-02\n---\n<script>alert(1)</script>\n",
    );
    dir
}

fn app_for(app: &Letterbox, live_reload: bool) -> Router {
    let state = Arc::new(AppState::new(app, live_reload).unwrap());
    router(app, state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_known_slug_renders_page() {
    let dir = seeded_site();
    let app = Letterbox::new(dir.path()).unwrap();

    let (status, body) = get(app_for(&app, false), "/letters/2023-01-spring-update").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Spring Update</title>"));
    assert!(body.contains(r#"<time datetime="2023-01-15">January 15, 2023</time>"#));
    assert!(body.contains("<article>\n<p>Hello</p>\n</article>"));
    assert!(!body.contains("__livereload"));
}

#[tokio::test]
async fn test_unknown_slug_is_404() {
    let dir = seeded_site();
    let app = Letterbox::new(dir.path()).unwrap();

    let (status, body) = get(app_for(&app, false), "/letters/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not Found");
}

#[tokio::test]
async fn test_untrusted_html_is_escaped_in_page() {
    let dir = seeded_site();
    let app = Letterbox::new(dir.path()).unwrap();

    let (status, body) = get(app_for(&app, false), "/letters/2022-11-autumn").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("<script>alert(1)</script>"));
    assert!(body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(body.contains("<title>Autumn &lt;Notes&gt;</title>"));
}

#[tokio::test]
async fn test_index_lists_newest_first() {
    let dir = seeded_site();
    let app = Letterbox::new(dir.path()).unwrap();

    let (status, body) = get(app_for(&app, false), "/letters").await;

    assert_eq!(status, StatusCode::OK);
    let spring = body.find("/letters/2023-01-spring-update").unwrap();
    let autumn = body.find("/letters/2022-11-autumn").unwrap();
    assert!(spring < autumn);
}

#[tokio::test]
async fn test_home_redirects_to_index() {
    let dir = seeded_site();
    let app = Letterbox::new(dir.path()).unwrap();

    let response = app_for(&app, false)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/letters");
}

#[tokio::test]
async fn test_custom_root() {
    let dir = seeded_site();
    let config = ArchiveConfig {
        root: "/news/".to_string(),
        ..ArchiveConfig::default()
    };
    let app = Letterbox::with_config(dir.path(), config);

    let (status, body) = get(app_for(&app, false), "/news/letters/2023-01-spring-update").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"href="/news/letters""#));

    let (status, _) = get(app_for(&app, false), "/letters/2023-01-spring-update").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_live_reload_script_injected() {
    let dir = seeded_site();
    let app = Letterbox::new(dir.path()).unwrap();

    let (status, body) = get(app_for(&app, true), "/letters/2023-01-spring-update").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/__livereload"));
}

#[tokio::test]
async fn test_assets_are_served() {
    let dir = seeded_site();
    fs::create_dir_all(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets").join("note.txt"), "static").unwrap();
    let app = Letterbox::new(dir.path()).unwrap();

    let (status, body) = get(app_for(&app, false), "/assets/note.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "static");
}

#[tokio::test]
async fn test_letter_edits_show_up_without_restart() {
    let dir = seeded_site();
    let app = Letterbox::new(dir.path()).unwrap();
    let router = app_for(&app, false);

    let (status, _) = get(router.clone(), "/letters/brand-new").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    write_letter(
        dir.path(),
        "brand-new.md",
        "---\nsubject: Brand New\ndate: 2024-02-02\n---\nFresh.",
    );

    let (status, body) = get(router, "/letters/brand-new").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<p>Fresh.</p>"));
}
