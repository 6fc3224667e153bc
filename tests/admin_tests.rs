// tests/admin_tests.rs

use std::sync::Arc;

use quizgate::config::Config;
use quizgate::mailer::NullMailer;
use quizgate::routes;
use quizgate::state::AppState;
use quizgate::store::{FileStore, MemoryStore};

async fn spawn_app() -> (String, tempfile::TempDir) {
    let store_dir = tempfile::tempdir().expect("Failed to create temp data dir");

    let config = Config {
        data_dir: store_dir.path().display().to_string(),
        jwt_secret: "admin_test_secret".to_string(),
        jwt_expiration: 600,
        admin_email: "admin@gmail.com".to_string(),
        allowed_emails: vec!["test@gmail.com".to_string()],
        email_domain: "@gmail.com".to_string(),
        relay_url: None,
        relay_timeout_secs: 5,
        rust_log: "error".to_string(),
    };

    let state = AppState {
        durable: Arc::new(FileStore::open(store_dir.path()).expect("Failed to open store")),
        ephemeral: Arc::new(MemoryStore::new()),
        mailer: Arc::new(NullMailer),
        config,
    };

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, store_dir)
}

async fn authenticate(client: &reqwest::Client, address: &str, email: &str, name: &str) -> String {
    let issue: serde_json::Value = client
        .post(format!("{}/api/auth/request-code", address))
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let code = issue["code"].as_str().expect("Code not in body");

    client
        .post(format!("{}/api/auth/verify-code", address))
        .json(&serde_json::json!({ "email": email, "code": code }))
        .send()
        .await
        .unwrap();

    let register: serde_json::Value = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({ "email": email, "name": name }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    register["token"].as_str().expect("Token not found").to_string()
}

async fn create_question(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    prompt: &str,
) -> String {
    let response: serde_json::Value = client
        .post(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "prompt": prompt,
            "options": ["Yes", "No"],
            "correct_answers": [0],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    response["id"].as_str().expect("id missing").to_string()
}

#[tokio::test]
async fn admin_surface_requires_the_admin_role() {
    let (address, _store_dir) = spawn_app().await;
    let client = reqwest::Client::new();

    // No token at all
    let anonymous = client
        .get(format!("{}/api/admin/statistics", address))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    // A plain user token is not enough
    let user_token = authenticate(&client, &address, "test@gmail.com", "Jane Doe").await;
    let forbidden = client
        .get(format!("{}/api/admin/statistics", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);
}

#[tokio::test]
async fn config_update_round_trips() {
    let (address, _store_dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = authenticate(&client, &address, "admin@gmail.com", "Quiz Admin").await;

    let update = serde_json::json!({
        "title": "Friday Night Trivia",
        "is_active": false,
        "start_date": "2026-03-01T09:00:00Z",
        "end_date": "2026-03-31T23:59:59Z",
    });

    let put = client
        .put(format!("{}/api/admin/config", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(put.status().as_u16(), 200);

    let config: serde_json::Value = client
        .get(format!("{}/api/admin/config", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(config["title"], "Friday Night Trivia");
    assert_eq!(config["is_active"], false);
    // Dates survive as the same instants.
    assert_eq!(config["start_date"], "2026-03-01T09:00:00Z");

    // An inactive quiz serves no questions.
    let quiz: serde_json::Value = client
        .get(format!("{}/api/quiz", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["available"], false);
    assert_eq!(quiz["questions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn backwards_schedule_is_rejected() {
    let (address, _store_dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = authenticate(&client, &address, "admin@gmail.com", "Quiz Admin").await;

    let response = client
        .put(format!("{}/api/admin/config", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "Backwards",
            "is_active": true,
            "start_date": "2026-03-31T00:00:00Z",
            "end_date": "2026-03-01T00:00:00Z",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn invalid_question_payloads_are_rejected() {
    let (address, _store_dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = authenticate(&client, &address, "admin@gmail.com", "Quiz Admin").await;

    let cases = [
        // Fewer than two options
        serde_json::json!({
            "prompt": "Lonely option",
            "options": ["Only one"],
            "correct_answers": [0],
        }),
        // No correct answer selected
        serde_json::json!({
            "prompt": "No answer",
            "options": ["A", "B"],
            "correct_answers": [],
        }),
        // Correct index out of range
        serde_json::json!({
            "prompt": "Out of range",
            "options": ["A", "B"],
            "correct_answers": [5],
        }),
        // Blank option text
        serde_json::json!({
            "prompt": "Blank option",
            "options": ["A", "   "],
            "correct_answers": [0],
        }),
    ];

    for payload in cases {
        let response = client
            .post(format!("{}/api/admin/questions", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    // Nothing was persisted.
    let questions: serde_json::Value = client
        .get(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn question_edit_preserves_the_id() {
    let (address, _store_dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = authenticate(&client, &address, "admin@gmail.com", "Quiz Admin").await;

    let id = create_question(&client, &address, &token, "Original prompt").await;

    let update = client
        .put(format!("{}/api/admin/questions/{}", address, id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "prompt": "Edited prompt",
            "options": ["Yes", "No", "Maybe"],
            "correct_answers": [2],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(update.status().as_u16(), 200);

    let questions: serde_json::Value = client
        .get(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let questions = questions.as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["id"], id.as_str());
    assert_eq!(questions[0]["prompt"], "Edited prompt");

    // Editing an unknown id is a 404.
    let missing = client
        .put(format!("{}/api/admin/questions/not-a-real-id", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "prompt": "Ghost",
            "options": ["A", "B"],
            "correct_answers": [0],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn question_deletion_is_gated_by_the_confirmation_code() {
    let (address, _store_dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = authenticate(&client, &address, "admin@gmail.com", "Quiz Admin").await;

    let id = create_question(&client, &address, &token, "Doomed question").await;

    // Begin: the code is shown, nothing is deleted yet.
    let begin: serde_json::Value = client
        .post(format!("{}/api/admin/deletions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "kind": "question", "target_id": id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let code = begin["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);

    client
        .post(format!("{}/api/admin/deletions/ack", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // A mismatched code deletes nothing and keeps the pending action.
    let wrong_code = if code == "111111" { "222222" } else { "111111" };
    let mismatch = client
        .post(format!("{}/api/admin/deletions/confirm", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "code": wrong_code }))
        .send()
        .await
        .unwrap();
    assert_eq!(mismatch.status().as_u16(), 400);

    let still_there: serde_json::Value = client
        .get(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(still_there.as_array().unwrap().len(), 1);

    // The exact code applies the deletion and resets the workflow.
    let confirm = client
        .post(format!("{}/api/admin/deletions/confirm", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(confirm.status().as_u16(), 200);

    let gone: serde_json::Value = client
        .get(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(gone.as_array().unwrap().len(), 0);

    // The workflow is back to idle: a second confirm finds nothing pending.
    let idle = client
        .post(format!("{}/api/admin/deletions/confirm", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(idle.status().as_u16(), 400);
}

#[tokio::test]
async fn deleting_all_results_reopens_the_quiz_for_everyone() {
    let (address, _store_dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = authenticate(&client, &address, "admin@gmail.com", "Quiz Admin").await;

    // Open the schedule window so the visitor can actually submit.
    client
        .put(format!("{}/api/admin/config", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "title": "Retake Trivia",
            "is_active": true,
            "start_date": "2020-01-01T00:00:00Z",
            "end_date": "2099-12-31T23:59:59Z",
        }))
        .send()
        .await
        .unwrap();

    create_question(&client, &address, &admin_token, "Only question").await;

    // A visitor completes the quiz once.
    let user_token = authenticate(&client, &address, "test@gmail.com", "Jane Doe").await;
    let quiz: serde_json::Value = client
        .get(format!("{}/api/quiz", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = quiz["questions"][0]["id"].as_str().unwrap();

    client
        .post(format!("{}/api/quiz/submit", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({
            "answers": [{ "question_id": question_id, "selected": [0] }],
            "time_spent_seconds": 30,
        }))
        .send()
        .await
        .unwrap();

    // Purge everything through the gate.
    let begin: serde_json::Value = client
        .post(format!("{}/api/admin/deletions", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "kind": "all_results" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let code = begin["code"].as_str().unwrap();

    client
        .post(format!("{}/api/admin/deletions/ack", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    let confirm = client
        .post(format!("{}/api/admin/deletions/confirm", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(confirm.status().as_u16(), 200);

    let stats: serde_json::Value = client
        .get(format!("{}/api/admin/statistics", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total_submissions"], 0);

    // The completed-users set was cleared too: the same visitor can pass
    // the name step again.
    let retake = authenticate(&client, &address, "test@gmail.com", "Jane Doe").await;
    assert!(!retake.is_empty());
}
