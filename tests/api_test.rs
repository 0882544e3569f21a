//! HTTP integration tests
//!
//! Login, record pages, print/CSV export, and role gates through the full
//! router.

mod common;

use anyhow::Result;
use axum::http::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    HeaderValue, StatusCode,
};
use axum_test::{TestRequest, TestServer};
use barangay::config::AppConfig;
use barangay::database::seed_data::seed_default_accounts;
use barangay::schema::RecordType;
use barangay::server::app::create_app;
use serde_json::Value;

use common::{setup_test_db, TestDb};

/// Keeps the database file alive alongside the server.
struct TestApp {
    server: TestServer,
    _db: TestDb,
}

async fn setup_test_server() -> Result<TestApp> {
    let test_db = setup_test_db().await?;
    seed_default_accounts(&test_db.db).await?;

    let app = create_app(test_db.db.clone(), AppConfig::default()).await?;
    let server = TestServer::new(app)?;

    Ok(TestApp {
        server,
        _db: test_db,
    })
}

/// Logs in and returns the `name=value` part of the session cookie.
async fn login(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let response = server
        .post("/login")
        .form(&[("username", username), ("password", password)])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let cookie = response.header(SET_COOKIE);
    let cookie = cookie
        .to_str()?
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("brgy_session="));
    Ok(cookie)
}

fn with_cookie(request: TestRequest, cookie: &str) -> TestRequest {
    request.add_header(COOKIE, HeaderValue::from_str(cookie).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let app = setup_test_server().await?;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "barangay-records");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_login_flow() -> Result<()> {
    let app = setup_test_server().await?;

    let response = app
        .server
        .post("/login")
        .form(&[("username", "captain"), ("password", "nope-nope")])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Invalid credentials"));

    let cookie = login(&app.server, "captain", "captain123").await?;

    let response = with_cookie(app.server.get("/"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), "/admin");

    let response = with_cookie(app.server.get("/admin"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let page = response.text();
    assert!(page.contains("Logged in as captain"));
    assert!(page.contains("First Job Seeker"));

    let response = with_cookie(app.server.get("/logout"), &cookie).await;
    assert_eq!(response.header(LOCATION), "/login?notice=logged_out");

    let response = with_cookie(app.server.get("/admin"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), "/login");

    Ok(())
}

#[tokio::test]
async fn test_pages_require_login() -> Result<()> {
    let app = setup_test_server().await?;

    for path in ["/", "/indigency", "/print", "/users", "/recovery"] {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(response.header(LOCATION), "/login", "{}", path);
    }

    Ok(())
}

#[tokio::test]
async fn test_create_list_edit_delete_record() -> Result<()> {
    let app = setup_test_server().await?;
    let cookie = login(&app.server, "secretary", "secretary123").await?;

    let response = with_cookie(app.server.post("/indigency"), &cookie)
        .form(&[("name", "Ana Reyes"), ("purpose", "Medical"), ("date_issued", "2025-02-03")])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), "/indigency");

    let response = with_cookie(app.server.get("/indigency"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let page = response.text();
    assert!(page.contains("Indigency created!"));
    assert!(page.contains("Ana Reyes"));
    assert!(page.contains("2025-02-03"));

    // Duplicate names bounce back with a message
    with_cookie(app.server.post("/indigency"), &cookie)
        .form(&[("name", "Ana Reyes")])
        .await;
    let page = with_cookie(app.server.get("/indigency"), &cookie).await.text();
    assert!(page.contains("already exists"));

    let response = with_cookie(app.server.get("/indigency/edit/1"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("value=\"Ana Reyes\""));

    let response = with_cookie(app.server.post("/indigency/edit/1"), &cookie)
        .form(&[("name", "Ana R. Reyes"), ("purpose", "Medical")])
        .await;
    assert_eq!(response.header(LOCATION), "/indigency");

    let response = with_cookie(app.server.post("/indigency/delete/1"), &cookie).await;
    assert_eq!(response.header(LOCATION), "/indigency");
    let page = with_cookie(app.server.get("/indigency"), &cookie).await.text();
    assert!(page.contains("Record deleted!"));
    assert!(!page.contains("Ana R. Reyes"));

    Ok(())
}

#[tokio::test]
async fn test_missing_record_is_404() -> Result<()> {
    let app = setup_test_server().await?;
    let cookie = login(&app.server, "secretary", "secretary123").await?;

    let response = with_cookie(app.server.get("/clearance/edit/999"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = with_cookie(app.server.post("/clearance/delete/999"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_unknown_type_redirects_home() -> Result<()> {
    let app = setup_test_server().await?;
    let cookie = login(&app.server, "secretary", "secretary123").await?;

    let response = with_cookie(app.server.get("/passport"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), "/");

    let page = with_cookie(app.server.get("/staff"), &cookie).await.text();
    assert!(page.contains("Invalid type"));

    Ok(())
}

#[tokio::test]
async fn test_csv_export() -> Result<()> {
    let app = setup_test_server().await?;
    let cookie = login(&app.server, "captain", "captain123").await?;

    with_cookie(app.server.post("/clearance"), &cookie)
        .form(&[
            ("name", "Jose Rizal"),
            ("birthday", "1990-06-19"),
            ("gender", "Male"),
            ("date_issued", "2025-01-15"),
        ])
        .await;

    let response = with_cookie(app.server.get("/print"), &cookie)
        .add_query_param("rtype", "clearance")
        .add_query_param("export", "csv")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.header(CONTENT_TYPE).to_str()?.starts_with("text/csv"));
    assert_eq!(
        response.header(CONTENT_DISPOSITION),
        "attachment; filename=clearance_all_all.csv"
    );

    let body = response.text();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], RecordType::Clearance.column_names().join(","));
    assert!(lines[1].starts_with("1,Jose Rizal,,1990-06-19,,Male,"));
    assert!(lines[1].contains("2025-01-15"));

    let response = with_cookie(app.server.get("/print"), &cookie)
        .add_query_param("rtype", "clearance")
        .add_query_param("month", "2")
        .add_query_param("year", "2025")
        .add_query_param("export", "csv")
        .await;
    assert_eq!(
        response.header(CONTENT_DISPOSITION),
        "attachment; filename=clearance_2_2025.csv"
    );
    assert_eq!(response.text().lines().count(), 1);

    let response = with_cookie(app.server.get("/print"), &cookie)
        .add_query_param("rtype", "clearance")
        .add_query_param("q", "rizal")
        .add_query_param("month", "1")
        .add_query_param("year", "2025")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let page = response.text();
    assert!(page.contains("Jose Rizal"));
    // The CSV link carries the same filter as the printed rows
    assert!(page.contains(
        "/print?rtype&#x3D;clearance&amp;q&#x3D;rizal&amp;month&#x3D;1&amp;year&#x3D;2025&amp;export&#x3D;csv"
    ));

    let response = with_cookie(app.server.get("/print"), &cookie)
        .add_query_param("rtype", "permit")
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let page = with_cookie(app.server.get("/admin"), &cookie).await.text();
    assert!(page.contains("Invalid print type"));

    Ok(())
}

#[tokio::test]
async fn test_admin_pages_are_forbidden_for_staff() -> Result<()> {
    let app = setup_test_server().await?;
    let cookie = login(&app.server, "secretary", "secretary123").await?;

    for path in ["/users", "/activity_log", "/export-logs-excel", "/recovery", "/backup_database"] {
        let response = with_cookie(app.server.get(path), &cookie).await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN, "{}", path);
    }

    let response = with_cookie(app.server.post("/reset_database"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_admin_pages() -> Result<()> {
    let app = setup_test_server().await?;
    let cookie = login(&app.server, "captain", "captain123").await?;

    with_cookie(app.server.post("/goodmoral"), &cookie)
        .form(&[("name", "Lola Basyang")])
        .await;
    with_cookie(app.server.post("/goodmoral/delete/1"), &cookie).await;

    let page = with_cookie(app.server.get("/activity_log"), &cookie).await.text();
    assert!(page.contains("1 - Lola Basyang"));

    let response = with_cookie(app.server.get("/export-logs-excel"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header(CONTENT_DISPOSITION),
        "attachment; filename=activity_logs.xlsx"
    );
    assert!(response.as_bytes().starts_with(b"PK"));

    let response = with_cookie(app.server.get("/backup_database"), &cookie).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.as_bytes().starts_with(b"SQLite format 3"));

    let response = with_cookie(app.server.post("/users"), &cookie)
        .form(&[("username", "kagawad"), ("password", "kagawad123"), ("role", "staff")])
        .await;
    assert_eq!(response.header(LOCATION), "/users");
    let page = with_cookie(app.server.get("/users"), &cookie).await.text();
    assert!(page.contains("User &#x27;kagawad&#x27; created") || page.contains("User 'kagawad' created"));

    let response = with_cookie(app.server.post("/reset_database"), &cookie).await;
    assert_eq!(response.header(LOCATION), "/recovery");
    let page = with_cookie(app.server.get("/recovery"), &cookie).await.text();
    assert!(page.contains("Database reset"));

    Ok(())
}
