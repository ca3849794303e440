pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::agent::handlers as agent;
use crate::export::handlers as export;
use crate::resume::handlers as resume;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Intake
        .route("/api/v1/resumes", post(resume::handle_create))
        .route("/api/v1/resumes/parse", post(resume::handle_parse))
        .route("/api/v1/resumes/generate", post(resume::handle_generate))
        // Sessions
        .route(
            "/api/v1/sessions/:id",
            get(agent::handle_get_session).delete(agent::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/score", post(scoring::handle_score))
        .route("/api/v1/sessions/:id/edit", post(agent::handle_edit))
        .route("/api/v1/sessions/:id/undo", post(agent::handle_undo))
        .route(
            "/api/v1/sessions/:id/highlights/clear",
            post(agent::handle_clear_highlights),
        )
        .route(
            "/api/v1/sessions/:id/suggestions",
            get(agent::handle_suggestions),
        )
        .route(
            "/api/v1/sessions/:id/export/:format",
            get(export::handle_export),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extract::docx::tests::docx_bytes;
    use crate::llm_client::testing::ScriptedDelegate;
    use crate::sessions::SessionStore;

    fn app(delegate: ScriptedDelegate) -> Router {
        build_router(AppState {
            llm: Arc::new(delegate),
            sessions: SessionStore::new(),
            config: Config::for_tests(),
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(file_name: &str, data: &[u8], target_role: &str) -> Request<Body> {
        let boundary = "resume-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"target_role\"\r\n\r\n{target_role}\r\n\
                 --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::post("/api/v1/resumes/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(ScriptedDelegate::new());
        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let delegate = ScriptedDelegate::new().reply(
            json!({
                "section": "skills",
                "action": "Added Go to skills",
                "updated_content": ["Python", "Go"],
                "explanation": "Go appended.",
                "change_type": "add"
            })
            .to_string(),
        );
        let app = app(delegate);

        let (status, created) = send(
            &app,
            post_json(
                "/api/v1/resumes",
                json!({"resume": {"name": "Jane", "skills": ["Python"], "hobbies": "chess"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["warnings"][0], "Ignored unknown fields: hobbies");
        let id = created["session_id"].as_str().unwrap().to_string();

        let (status, edited) = send(
            &app,
            post_json(
                &format!("/api/v1/sessions/{id}/edit"),
                json!({"command": "add Go to my skills"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["outcome"]["status"], "applied");
        assert_eq!(edited["session"]["resume"]["skills"], json!(["Python", "Go"]));
        assert_eq!(edited["session"]["changed_sections"], json!(["skills"]));
        assert_eq!(edited["session"]["history_len"], 2);

        let (_, undone) = send(
            &app,
            Request::post(format!("/api/v1/sessions/{id}/undo"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(undone["outcome"]["undone"], true);
        assert_eq!(undone["session"]["resume"]["skills"], json!(["Python"]));

        let (status, _) = send(
            &app,
            Request::delete(format!("/api/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            Request::get(format!("/api/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_score_uses_fallback_when_delegate_down() {
        let app = app(ScriptedDelegate::new().fail("down"));
        let (_, created) = send(
            &app,
            post_json("/api/v1/resumes", json!({"resume": {"name": "Jane"}})),
        )
        .await;
        let id = created["session_id"].as_str().unwrap().to_string();

        let (status, score) = send(
            &app,
            post_json(
                &format!("/api/v1/sessions/{id}/score"),
                json!({"job_description": "Data analyst"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(score["score"], 3);
        assert_eq!(score["category"], "Poor");
        assert_eq!(score["strengths"], json!(["Resume structure is present"]));
    }

    #[tokio::test]
    async fn test_parse_docx_upload() {
        let delegate = ScriptedDelegate::new().reply(
            json!({"name": "Ada Lovelace", "email": "ada@example.com",
                   "skills": ["Mathematics"]})
            .to_string(),
        );
        let app = app(delegate);
        let data = docx_bytes(&["Ada Lovelace", "ada@example.com"]);

        let (status, body) = send(&app, multipart("cv.docx", &data, "Programmer")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["resume"]["name"], "Ada Lovelace");
        assert_eq!(body["resume"]["target_role"], "Programmer");
    }

    #[tokio::test]
    async fn test_parse_rejects_unsupported_upload() {
        let app = app(ScriptedDelegate::new());
        let (status, body) = send(&app, multipart("cv.txt", b"plain text", "Programmer")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
        assert!(body["error"]["hint"]
            .as_str()
            .unwrap()
            .starts_with("Try a different file"));
    }

    #[tokio::test]
    async fn test_generate_requires_complete_entry() {
        let app = app(ScriptedDelegate::new());
        let (status, body) = send(
            &app,
            post_json("/api/v1/resumes/generate", json!({"resume": {"name": "Jane"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_export_docx_download() {
        let app = app(ScriptedDelegate::new());
        let (_, created) = send(
            &app,
            post_json("/api/v1/resumes", json!({"resume": {"name": "Jane Doe"}})),
        )
        .await;
        let id = created["session_id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/export/docx"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Doe_resume.docx\""
        );

        let (status, _) = send(
            &app,
            Request::get(format!("/api/v1/sessions/{id}/export/rtf"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
