use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::middleware::auth_middleware;
use crate::features::auth::AuthService;
use crate::features::files::handlers::{
    create_file, create_form, delete_file, download_file, list_files, update_file, update_form,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature.
///
/// Everything but download sits behind the session check.
pub fn routes(
    file_service: Arc<FileService>,
    auth_service: Arc<AuthService>,
    max_body_size: usize,
) -> Router {
    let protected = Router::new()
        .route("/", get(list_files))
        .route("/create", get(create_form).post(create_file))
        .route("/{id}/update", get(update_form).post(update_file))
        .route("/{id}/delete", post(delete_file))
        .route_layer(from_fn_with_state(auth_service, auth_middleware));

    let public = Router::new().route("/{id}/download", get(download_file));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(file_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::CurrentUser;
    use crate::shared::test_helpers::{auth_service, bearer, issue_token, seed_user, setup_pool};
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use sqlx::SqlitePool;

    const PDF: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<>>\nendobj\n";

    struct TestApp {
        server: TestServer,
        pool: SqlitePool,
        alice: CurrentUser,
        bob: CurrentUser,
    }

    async fn setup() -> TestApp {
        let pool = setup_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        let app = routes(
            Arc::new(FileService::new(pool.clone())),
            Arc::new(auth_service(pool.clone())),
            1024 * 1024,
        );

        TestApp {
            server: TestServer::new(app).unwrap(),
            pool,
            alice,
            bob,
        }
    }

    fn upload(title: &str, contents: &[u8]) -> MultipartForm {
        MultipartForm::new()
            .add_text("friendly_title", title)
            .add_part(
                "file",
                Part::bytes(contents.to_vec())
                    .file_name("upload.bin")
                    .mime_type("application/octet-stream"),
            )
    }

    async fn file_ids(pool: &SqlitePool) -> Vec<i64> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM files ORDER BY id")
            .fetch_all(pool)
            .await
            .unwrap()
    }

    fn location(response: &axum_test::TestResponse) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_report_pdf_scenario() {
        let app = setup().await;

        let created = app
            .server
            .post("/create")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .multipart(upload("report.pdf", PDF))
            .await;
        created.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&created), "/");

        let ids = file_ids(&app.pool).await;
        assert_eq!(ids.len(), 1);
        let id = ids[0];

        let list = app
            .server
            .get("/")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .await;
        list.assert_status(StatusCode::OK);
        let html = list.text();
        assert_eq!(html.matches("report.pdf").count(), 1);
        assert!(html.contains(&format!("{} bytes", PDF.len())));
        assert!(html.contains(&format!("href=\"/{}/download\"", id)));
        assert!(html.contains(&format!("href=\"/{}/update\"", id)));
        assert!(html.contains(&format!("action=\"/{}/delete\"", id)));

        let download = app.server.get(&format!("/{}/download", id)).await;
        download.assert_status(StatusCode::OK);
        assert_eq!(download.as_bytes().as_ref(), PDF);

        let hijack = app
            .server
            .post(&format!("/{}/update", id))
            .add_header(header::AUTHORIZATION, bearer(app.bob.id))
            .multipart(upload("mine now", b"evil"))
            .await;
        hijack.assert_status(StatusCode::FORBIDDEN);

        let deleted = app
            .server
            .post(&format!("/{}/delete", id))
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .await;
        deleted.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&deleted), "/");

        let gone = app.server.get(&format!("/{}/download", id)).await;
        gone.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_sets_type_and_filename_headers() {
        let app = setup().await;
        for (title, contents) in [("report.pdf", PDF), ("Makefile", b"all:".as_slice())] {
            app.server
                .post("/create")
                .add_header(header::AUTHORIZATION, bearer(app.alice.id))
                .multipart(upload(title, contents))
                .await
                .assert_status(StatusCode::SEE_OTHER);
        }
        let ids = file_ids(&app.pool).await;

        let response = app.server.get(&format!("/{}/download", ids[0])).await;
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/pdf");
        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("inline;"));
        assert!(disposition.contains("filename=\"report.pdf\""));

        let response = app.server.get(&format!("/{}/download", ids[1])).await;
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
        assert_eq!(response.as_bytes().as_ref(), b"all:");
    }

    #[tokio::test]
    async fn test_download_unknown_id_is_404() {
        let app = setup().await;
        let response = app.server.get("/12345/download").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("File id 12345 doesn"));
    }

    #[tokio::test]
    async fn test_protected_routes_redirect_to_login() {
        let app = setup().await;

        for path in ["/", "/create", "/1/update"] {
            let response = app.server.get(path).await;
            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/auth/login");
        }

        for path in ["/1/delete", "/create", "/1/update"] {
            let response = app.server.post(path).await;
            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/auth/login");
        }

        let response = app
            .server
            .post("/create")
            .multipart(upload("sneaky", b"x"))
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/login");
        assert!(file_ids(&app.pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_token_redirects_to_login() {
        let app = setup().await;
        let response = app
            .server
            .get("/")
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_static("Bearer not-a-token"),
            )
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/login");
    }

    #[tokio::test]
    async fn test_session_cookie_is_accepted() {
        let app = setup().await;
        let cookie = format!("session={}", issue_token(app.alice.id));
        let response = app
            .server
            .get("/")
            .add_header(header::COOKIE, HeaderValue::from_str(&cookie).unwrap())
            .await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("alice"));
    }

    #[tokio::test]
    async fn test_create_with_empty_title_redisplays_form() {
        let app = setup().await;
        let response = app
            .server
            .post("/create")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .multipart(upload("", b"data"))
            .await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("Title is required."));
        assert!(file_ids(&app.pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_create_without_file_field_is_bad_request() {
        let app = setup().await;
        let response = app
            .server
            .post("/create")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .multipart(MultipartForm::new().add_text("friendly_title", "lonely"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(file_ids(&app.pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_flow_for_owner() {
        let app = setup().await;
        app.server
            .post("/create")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .multipart(upload("draft.txt", b"v1"))
            .await
            .assert_status(StatusCode::SEE_OTHER);
        let id = file_ids(&app.pool).await[0];

        let form = app
            .server
            .get(&format!("/{}/update", id))
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .await;
        form.assert_status(StatusCode::OK);
        assert!(form.text().contains("draft.txt"));

        let invalid = app
            .server
            .post(&format!("/{}/update", id))
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .multipart(upload("", b"v2"))
            .await;
        invalid.assert_status(StatusCode::OK);
        let html = invalid.text();
        assert!(html.contains("Title is required."));
        assert!(html.contains("draft.txt"));

        app.server
            .post(&format!("/{}/update", id))
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .multipart(upload("final.txt", b"v2"))
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let list = app
            .server
            .get("/")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .await;
        let html = list.text();
        assert!(html.contains("final.txt"));
        assert!(!html.contains("draft.txt"));

        let download = app.server.get(&format!("/{}/download", id)).await;
        assert_eq!(download.as_bytes().as_ref(), b"v2");
    }

    #[tokio::test]
    async fn test_non_owner_gets_forbidden_and_record_is_untouched() {
        let app = setup().await;
        app.server
            .post("/create")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .multipart(upload("alice.txt", b"original"))
            .await
            .assert_status(StatusCode::SEE_OTHER);
        let id = file_ids(&app.pool).await[0];

        app.server
            .get(&format!("/{}/update", id))
            .add_header(header::AUTHORIZATION, bearer(app.bob.id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.server
            .post(&format!("/{}/update", id))
            .add_header(header::AUTHORIZATION, bearer(app.bob.id))
            .multipart(upload("", b"evil"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.server
            .post(&format!("/{}/delete", id))
            .add_header(header::AUTHORIZATION, bearer(app.bob.id))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let bob_list = app
            .server
            .get("/")
            .add_header(header::AUTHORIZATION, bearer(app.bob.id))
            .await;
        assert!(!bob_list.text().contains("alice.txt"));

        let download = app.server.get(&format!("/{}/download", id)).await;
        assert_eq!(download.as_bytes().as_ref(), b"original");
    }

    #[tokio::test]
    async fn test_mutating_unknown_id_is_404() {
        let app = setup().await;
        app.server
            .get("/77/update")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .post("/77/delete")
            .add_header(header::AUTHORIZATION, bearer(app.alice.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
