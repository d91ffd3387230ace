pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/rules", get(handlers::handle_list_rules))
        .route(
            "/api/v1/evaluate",
            post(handlers::handle_evaluate).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/export/markdown",
            post(handlers::handle_export_markdown),
        )
        .route("/api/v1/export/csv", post(handlers::handle_export_csv))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::document::docx::tests::build_docx;
    use crate::document::DOCX_MIME;
    use crate::evaluation::pipeline::tests::{
        ScriptedCompletion, EVALUATION_RESPONSE, EXTRACTION_RESPONSE,
    };
    use crate::evaluation::Evaluator;

    const BOUNDARY: &str = "eqe-test-boundary";

    fn app(llm: Arc<ScriptedCompletion>) -> Router {
        let config = Config::from_lookup(|key| match key {
            "AZURE_OPENAI_API_KEY" => Some("test-key".to_string()),
            "AZURE_OPENAI_ENDPOINT" => Some("https://eqe.openai.azure.com".to_string()),
            "AZURE_OPENAI_VERSION" => Some("2024-12-01-preview".to_string()),
            _ => None,
        })
        .unwrap();
        let evaluator = Evaluator::new(llm, config.llm.max_tokens);
        build_router(AppState { config, evaluator })
    }

    enum Part<'a> {
        File {
            name: &'a str,
            content_type: &'a str,
            bytes: Vec<u8>,
        },
        Text(&'a str, &'a str),
    }

    fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File {
                    name,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&bytes);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn docx_part<'a>() -> Part<'a> {
        Part::File {
            name: "requirements.docx",
            content_type: DOCX_MIME,
            bytes: build_docx(
                "<w:p><w:r><w:t>1. 概要</w:t></w:r></w:p>\
                 <w:p><w:r><w:t>システムは起動すること。</w:t></w:r></w:p>",
            ),
        }
    }

    async fn post_evaluate(app: Router, parts: Vec<Part<'_>>) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/evaluate")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(ScriptedCompletion::new(vec![]))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_rules() {
        let response = app(ScriptedCompletion::new(vec![]))
            .oneshot(Request::get("/api/v1/rules").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let rules = body.as_array().unwrap();
        assert_eq!(rules.len(), 5);
        assert_eq!(rules[0]["name"], "簡潔な文");
        assert!(rules.iter().all(|r| r["default_selected"] == true));
    }

    #[tokio::test]
    async fn test_evaluate_docx() {
        let llm = ScriptedCompletion::new(vec![
            Ok(EXTRACTION_RESPONSE.to_string()),
            Ok(EVALUATION_RESPONSE.to_string()),
        ]);
        let response = post_evaluate(
            app(llm.clone()),
            vec![
                docx_part(),
                Part::Text("rules", "曖昧語の回避"),
                Part::Text("rules", "簡潔な文"),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["rules"], json!(["簡潔な文", "曖昧語の回避"]));
        assert_eq!(
            body["extraction"]["requirements"][0]["sentence"],
            "システムは起動すること。"
        );
        assert_eq!(body["evaluation"]["rows"].as_array().unwrap().len(), 2);
        assert_eq!(body["downloads"]["markdown"]["filename"], "evaluation.md");
        assert_eq!(body["downloads"]["csv"]["mime"], "text/csv");

        assert_eq!(llm.calls(), 2);
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("1. 概要\nシステムは起動すること。"));
    }

    #[tokio::test]
    async fn test_evaluate_accepts_comma_separated_rules() {
        let llm = ScriptedCompletion::new(vec![
            Ok(EXTRACTION_RESPONSE.to_string()),
            Ok(EVALUATION_RESPONSE.to_string()),
        ]);
        let response = post_evaluate(
            app(llm),
            vec![docx_part(), Part::Text("rules", "誤字脱字, 係り受け")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["rules"],
            json!(["誤字脱字", "係り受け"])
        );
    }

    #[tokio::test]
    async fn test_evaluate_without_rules_makes_no_calls() {
        let llm = ScriptedCompletion::new(vec![Ok(EXTRACTION_RESPONSE.to_string())]);
        let response = post_evaluate(app(llm.clone()), vec![docx_part()]).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "MISSING_INPUT");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_without_file() {
        let llm = ScriptedCompletion::new(vec![]);
        let response =
            post_evaluate(app(llm.clone()), vec![Part::Text("rules", "誤字脱字")]).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "MISSING_INPUT");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_unknown_rule() {
        let llm = ScriptedCompletion::new(vec![]);
        let response = post_evaluate(
            app(llm.clone()),
            vec![docx_part(), Part::Text("rules", "敬語")],
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_unreadable_file() {
        let llm = ScriptedCompletion::new(vec![]);
        let response = post_evaluate(
            app(llm.clone()),
            vec![
                Part::File {
                    name: "broken.docx",
                    content_type: DOCX_MIME,
                    bytes: b"not a zip archive".to_vec(),
                },
                Part::Text("rules", "誤字脱字"),
            ],
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["error"]["code"],
            "EXTRACTION_READ_ERROR"
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_empty_extraction() {
        let llm = ScriptedCompletion::new(vec![Ok("要求文は見つかりませんでした。".to_string())]);
        let response = post_evaluate(
            app(llm.clone()),
            vec![docx_part(), Part::Text("rules", "誤字脱字")],
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "EMPTY_EXTRACTION");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let request = Request::post("/api/v1/export/csv")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "evaluation_markdown": EVALUATION_RESPONSE }).to_string(),
            ))
            .unwrap();
        let response = app(ScriptedCompletion::new(vec![]))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"evaluation.csv\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(csv.starts_with("章番号・章名,元の記述,指摘理由,改善案\r\n2. 機能,"));
    }

    #[tokio::test]
    async fn test_export_csv_without_table() {
        let request = Request::post("/api/v1/export/csv")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "evaluation_markdown": "指摘事項はありません。" }).to_string(),
            ))
            .unwrap();
        let response = app(ScriptedCompletion::new(vec![]))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "EXPORT_ERROR");
    }

    #[tokio::test]
    async fn test_export_markdown_is_verbatim() {
        let request = Request::post("/api/v1/export/markdown")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "evaluation_markdown": EVALUATION_RESPONSE }).to_string(),
            ))
            .unwrap();
        let response = app(ScriptedCompletion::new(vec![]))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"evaluation.md\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], EVALUATION_RESPONSE.as_bytes());
    }
}
