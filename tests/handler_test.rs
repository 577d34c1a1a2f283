//! HTTP tests for the session flow, driven through axum-test.

use std::time::Duration;

use astro_notes::{
    config::AppConfig, create_test_router_with_config, create_test_router_with_mock,
    domain::prompt::PromptPair, error::AppError, NotesGenerator,
};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

const PASSWORD: &str = "test-password";

/// Generator that always returns the same notes
struct MockGeneratorSuccess {
    notes: String,
}

impl MockGeneratorSuccess {
    fn new(notes: &str) -> Self {
        Self {
            notes: notes.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl NotesGenerator for MockGeneratorSuccess {
    async fn generate(&self, _prompt: &PromptPair) -> Result<String, AppError> {
        Ok(self.notes.clone())
    }
}

/// Generator that echoes the prompt back, for inspecting what was sent
struct EchoGenerator;

#[async_trait::async_trait]
impl NotesGenerator for EchoGenerator {
    async fn generate(&self, prompt: &PromptPair) -> Result<String, AppError> {
        Ok(format!("{}\n---\n{}", prompt.system_prompt, prompt.user_message))
    }
}

/// Generator that always fails
struct MockGeneratorError;

#[async_trait::async_trait]
impl NotesGenerator for MockGeneratorError {
    async fn generate(&self, _prompt: &PromptPair) -> Result<String, AppError> {
        Err(AppError::GenerationAuth)
    }
}

/// Generator that never answers in time
struct SlowGenerator;

#[async_trait::async_trait]
impl NotesGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &PromptPair) -> Result<String, AppError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".to_string())
    }
}

fn class_notes(len: usize) -> String {
    "Photosynthesis converts light energy into chemical energy. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

async fn start_session(server: &TestServer) -> String {
    let response = server.post("/api/sessions").await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["result"]["sessionId"].as_str().unwrap().to_string()
}

async fn logged_in_session(server: &TestServer) -> String {
    let id = start_session(server).await;
    server
        .post(&format!("/api/sessions/{}/login", id))
        .json(&json!({ "password": PASSWORD }))
        .await
        .assert_status_ok();
    id
}

fn forwarded_for(ip: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(ip),
    )
}

mod session_lifecycle {
    use super::*;

    #[tokio::test]
    async fn should_start_on_login_screen() {
        // Arrange
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();

        // Act
        let response = server.post("/api/sessions").await;

        // Assert
        response.assert_status(StatusCode::CREATED);
        response.assert_json_contains(&json!({
            "isSuccess": true,
            "code": "COMMON200",
            "result": { "screen": "login" }
        }));
    }

    #[tokio::test]
    async fn should_return_current_view() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server.get(&format!("/api/sessions/{}", id)).await;

        response.assert_status_ok();
        response.assert_json_contains(&json!({
            "result": { "sessionId": id, "screen": "login" }
        }));
    }

    #[tokio::test]
    async fn should_route_unknown_client_screen_to_error_view() {
        // Arrange
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        // Act
        let response = server
            .get(&format!("/api/sessions/{}", id))
            .add_query_param("screen", "bogus")
            .await;

        // Assert
        response.assert_status_ok();
        response.assert_json_contains(&json!({ "result": { "screen": "error" } }));
        let body: Value = response.json();
        assert!(body["result"]["diagnostic"]
            .as_str()
            .unwrap()
            .contains("bogus"));
    }

    #[tokio::test]
    async fn should_keep_server_screen_for_known_client_screen() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server
            .get(&format!("/api/sessions/{}", id))
            .add_query_param("screen", "output")
            .await;

        response.assert_status_ok();
        response.assert_json_contains(&json!({ "result": { "screen": "login" } }));
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_session() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/sessions/00000000-0000-0000-0000-000000000000")
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json_contains(&json!({
            "isSuccess": false,
            "code": "SESSION_003",
            "level": "error"
        }));
    }

    #[tokio::test]
    async fn should_return_404_for_malformed_session_id() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/sessions/not-a-uuid").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_discard_deleted_session() {
        // Arrange
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        // Act
        let response = server.delete(&format!("/api/sessions/{}", id)).await;

        // Assert
        response.assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/sessions/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn home_should_return_501() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server.post(&format!("/api/sessions/{}/home", id)).await;

        response.assert_status(StatusCode::NOT_IMPLEMENTED);
        response.assert_json_contains(&json!({ "code": "COMMON501" }));
    }
}

mod login_handler {
    use super::*;

    #[tokio::test]
    async fn should_move_to_input_with_correct_password() {
        // Arrange
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        // Act
        let response = server
            .post(&format!("/api/sessions/{}/login", id))
            .json(&json!({ "password": PASSWORD }))
            .await;

        // Assert
        response.assert_status_ok();
        response.assert_json_contains(&json!({ "result": { "screen": "input" } }));
    }

    #[tokio::test]
    async fn should_return_401_for_wrong_password() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/login", id))
            .json(&json!({ "password": "wrong-password" }))
            .await;

        response.assert_status_unauthorized();
        response.assert_json_contains(&json!({
            "isSuccess": false,
            "code": "AUTH_002",
            "message": "Invalid password. Please try again.",
            "level": "error"
        }));
        server
            .get(&format!("/api/sessions/{}", id))
            .await
            .assert_json_contains(&json!({ "result": { "screen": "login" } }));
    }

    #[tokio::test]
    async fn should_warn_for_empty_password() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/login", id))
            .json(&json!({ "password": "" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({
            "code": "AUTH_001",
            "level": "warning"
        }));
    }

    #[tokio::test]
    async fn should_return_400_for_invalid_json() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/login", id))
            .content_type("application/json")
            .bytes("{invalid json}".as_bytes().into())
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "COMMON400" }));
    }

    #[tokio::test]
    async fn should_return_409_when_already_logged_in() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/login", id))
            .json(&json!({ "password": PASSWORD }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        response.assert_json_contains(&json!({ "code": "SESSION_002" }));
    }

    #[tokio::test]
    async fn should_return_429_after_too_many_attempts() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;
        for _ in 0..5 {
            server
                .post(&format!("/api/sessions/{}/login", id))
                .json(&json!({ "password": "guess" }))
                .await
                .assert_status_unauthorized();
        }

        let response = server
            .post(&format!("/api/sessions/{}/login", id))
            .json(&json!({ "password": PASSWORD }))
            .await;

        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        response.assert_json_contains(&json!({ "code": "AUTH_003" }));
    }

    #[tokio::test]
    async fn should_throttle_client_across_fresh_sessions() {
        // Arrange
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let (name, attacker) = forwarded_for("203.0.113.7");
        for _ in 0..5 {
            let id = start_session(&server).await;
            server
                .post(&format!("/api/sessions/{}/login", id))
                .add_header(name.clone(), attacker.clone())
                .json(&json!({ "password": "guess" }))
                .await
                .assert_status_unauthorized();
        }
        let fresh = start_session(&server).await;

        // Act
        let throttled = server
            .post(&format!("/api/sessions/{}/login", fresh))
            .add_header(name.clone(), attacker.clone())
            .json(&json!({ "password": PASSWORD }))
            .await;
        let (_, other) = forwarded_for("198.51.100.2");
        let other_client = server
            .post(&format!("/api/sessions/{}/login", fresh))
            .add_header(name, other)
            .json(&json!({ "password": PASSWORD }))
            .await;

        // Assert
        throttled.assert_status(StatusCode::TOO_MANY_REQUESTS);
        throttled.assert_json_contains(&json!({ "code": "AUTH_003" }));
        other_client.assert_status_ok();
        other_client.assert_json_contains(&json!({ "result": { "screen": "input" } }));
    }

    #[tokio::test]
    async fn should_return_400_common_for_mistyped_password() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/login", id))
            .json(&json!({ "password": 12345 }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "COMMON400" }));
    }
}

mod notes_handler {
    use super::*;

    #[tokio::test]
    async fn should_return_output_view_with_generated_notes() {
        // Arrange
        let app = create_test_router_with_mock(
            PASSWORD,
            MockGeneratorSuccess::new("- Light reactions\n- Calvin cycle"),
        );
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        // Act
        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({
                "text": class_notes(150),
                "notesType": "BULLET_POINTS",
                "notesStyle": "UNDERSTANDABLE",
                "format": "MARKDOWN",
                "useEmoji": true,
                "fixContent": true,
                "addExamples": false,
                "removeDuplicates": true,
                "removeIrrelevant": false
            }))
            .await;

        // Assert
        response.assert_status_ok();
        response.assert_json_contains(&json!({
            "isSuccess": true,
            "result": {
                "screen": "output",
                "generatedNotes": "- Light reactions\n- Calvin cycle",
                "options": { "addExamples": false, "removeIrrelevant": false }
            }
        }));
    }

    #[tokio::test]
    async fn should_send_assembled_prompt_and_raw_notes() {
        let app = create_test_router_with_mock(PASSWORD, EchoGenerator);
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;
        let notes = class_notes(150);

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": notes }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let echoed = body["result"]["generatedNotes"].as_str().unwrap();
        let (system_prompt, user_message) = echoed.split_once("\n---\n").unwrap();
        assert_eq!(user_message, notes);
        assert!(system_prompt.contains("TLDR"));
        assert!(system_prompt.ends_with("Give the notes, the summary, and that's it."));
        assert!(!system_prompt.contains(".  "));
    }

    #[tokio::test]
    async fn should_return_error_view_when_generation_fails() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorError);
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(200) }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["result"]["screen"], "error");
        assert!(body["result"].get("generatedNotes").is_none());
        let diagnostic = body["result"]["diagnostic"].as_str().unwrap();
        assert!(diagnostic.starts_with("Invalid screen state: generate"));
    }

    #[tokio::test]
    async fn should_return_error_view_when_generation_times_out() {
        // Arrange
        let mut config = AppConfig::for_tests(PASSWORD);
        config.generation_timeout = Duration::from_millis(50);
        let app = create_test_router_with_config(config, SlowGenerator);
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        // Act
        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(120) }))
            .await;

        // Assert
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["result"]["screen"], "error");
        assert!(body["result"]["diagnostic"]
            .as_str()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn should_return_400_for_empty_notes() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": "" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({
            "code": "NOTES_001",
            "message": "Oops! It looks like you forgot to enter your notes.",
            "level": "error"
        }));
    }

    #[tokio::test]
    async fn should_warn_for_short_notes_and_stay_on_input() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(99) }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "NOTES_002", "level": "warning" }));
        server
            .get(&format!("/api/sessions/{}", id))
            .await
            .assert_json_contains(&json!({ "result": { "screen": "input" } }));
    }

    #[tokio::test]
    async fn should_return_400_for_too_long_notes() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(10_001) }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "NOTES_003" }));
    }

    #[tokio::test]
    async fn should_return_400_for_unknown_option_value() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(150), "format": "HTML" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "NOTES_004" }));
    }

    #[tokio::test]
    async fn should_return_common_400_for_mistyped_text() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": 5 }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "COMMON400" }));
        server
            .get(&format!("/api/sessions/{}", id))
            .await
            .assert_json_contains(&json!({ "result": { "screen": "input" } }));
    }

    #[tokio::test]
    async fn should_return_common_400_for_mistyped_users_name() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(150), "usersName": 42 }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "COMMON400" }));
    }

    #[tokio::test]
    async fn should_return_501_for_personalization() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(150), "usersName": "Ada" }))
            .await;

        response.assert_status(StatusCode::NOT_IMPLEMENTED);
        response.assert_json_contains(&json!({ "code": "COMMON501" }));
    }

    #[tokio::test]
    async fn should_return_409_before_login() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = start_session(&server).await;

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(150) }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn should_reject_second_submission_from_output() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        let id = logged_in_session(&server).await;
        server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(150) }))
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("/api/sessions/{}/notes", id))
            .json(&json!({ "text": class_notes(150) }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        response.assert_json_contains(&json!({ "code": "SESSION_002" }));
    }
}

mod options_handler {
    use super::*;

    #[tokio::test]
    async fn should_return_option_catalogue() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/notes/options").await;

        response.assert_status_ok();
        response.assert_json_contains(&json!({
            "result": {
                "minChars": 100,
                "maxChars": 10000,
                "defaults": {
                    "notesType": "BULLET_POINTS",
                    "notesStyle": "UNDERSTANDABLE",
                    "format": "MARKDOWN",
                    "useEmoji": true
                }
            }
        }));
    }
}

mod health_handler {
    use super::*;

    #[tokio::test]
    async fn should_report_healthy_with_session_count() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();
        start_session(&server).await;

        let response = server.get("/health").await;

        response.assert_status_ok();
        response.assert_json_contains(&json!({
            "status": "healthy",
            "activeSessions": 1,
            "checks": { "promptTemplate": { "status": true } }
        }));
    }

    #[tokio::test]
    async fn should_echo_request_id_header() {
        let app = create_test_router_with_mock(PASSWORD, MockGeneratorSuccess::new("notes"));
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/health")
            .add_header(
                axum::http::HeaderName::from_static("x-request-id"),
                axum::http::HeaderValue::from_static("req-123"),
            )
            .await;

        assert_eq!(response.header("x-request-id"), "req-123");
    }
}
