// tests/api_tests.rs

use std::path::{Path, PathBuf};

use quiz_backend::{config::Config, routes, state::AppState};
use sqlx::sqlite::SqlitePoolOptions;

/// Helper to spawn the app on a random port with throwaway stores and a
/// seeded question directory. Returns the base URL.
async fn spawn_app(data_dir: &Path) -> String {
    let tmp = std::env::temp_dir();
    let identity_path = tmp.join(format!("quiz-identity-{}.db", uuid::Uuid::new_v4()));
    let ledger_path = tmp.join(format!("quiz-ledger-{}.db", uuid::Uuid::new_v4()));

    let identity_url = format!("sqlite://{}?mode=rwc", identity_path.display());
    let ledger_url = format!("sqlite://{}?mode=rwc", ledger_path.display());

    let identity_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&identity_url)
        .await
        .expect("Failed to open identity store");
    let ledger_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&ledger_url)
        .await
        .expect("Failed to open ledger store");

    sqlx::migrate!("./migrations/identity")
        .run(&identity_pool)
        .await
        .expect("Failed to migrate identity store");
    sqlx::migrate!("./migrations/ledger")
        .run(&ledger_pool)
        .await
        .expect("Failed to migrate ledger store");

    let config = Config {
        identity_database_url: identity_url,
        ledger_database_url: ledger_url,
        data_dir: data_dir.display().to_string(),
        session_ttl_secs: 600,
        tab_switch_threshold: 3,
        rust_log: "error".to_string(),
    };

    let state = AppState::new(identity_pool, ledger_pool, config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Creates a question data dir with sets a..d for (class11, jee), each the
/// same five questions with correct indices [1, 0, 2, 3, 1].
fn seed_question_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quiz-data-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    let correct = [1, 0, 2, 3, 1];
    let questions: Vec<serde_json::Value> = correct
        .iter()
        .enumerate()
        .map(|(id, &c)| {
            serde_json::json!({
                "id": id,
                "prompt": format!("Question {}", id),
                "options": ["A", "B", "C", "D"],
                "correct": c
            })
        })
        .collect();
    let body = serde_json::to_string(&questions).unwrap();

    for set in ["a", "b", "c", "d"] {
        std::fs::write(dir.join(format!("questions_class11_jee_{}.json", set)), &body).unwrap();
    }
    dir
}

/// Signs up a class-11 JEE student and returns the generated username.
async fn signup_student(
    client: &reqwest::Client,
    address: &str,
    full_name: &str,
    phone: &str,
) -> String {
    let response = client
        .post(format!("{}/signup", address))
        .json(&serde_json::json!({
            "full_name": full_name,
            "phone": phone,
            "email": format!("{}@example.com", phone),
            "password": "password123",
            "promoted_to_class": "11",
            "stream": "jee"
        }))
        .send()
        .await
        .expect("Signup failed");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["username"].as_str().unwrap().to_string()
}

async fn login(
    client: &reqwest::Client,
    address: &str,
    username: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Login request failed")
}

#[tokio::test]
async fn health_check_404() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn signup_derives_username() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let username = signup_student(&client, &address, "Ravi Kumar", "9876546789").await;
    assert_eq!(username, "ravi.kumar6789");
}

#[tokio::test]
async fn signup_rejects_bad_phone() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/signup", address))
        .json(&serde_json::json!({
            "full_name": "Bad Phone",
            "phone": "12345",
            "email": "bad@example.com",
            "password": "password123",
            "promoted_to_class": "11",
            "stream": "jee"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn signup_rejects_duplicate_phone() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    signup_student(&client, &address, "First Student", "9000000001").await;

    let response = client
        .post(format!("{}/signup", address))
        .json(&serde_json::json!({
            "full_name": "Other Person",
            "phone": "9000000001",
            "email": "other@example.com",
            "password": "password123",
            "promoted_to_class": "11",
            "stream": "jee"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn unknown_user_and_wrong_password_get_the_same_message() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let username = signup_student(&client, &address, "Login Test", "9000000002").await;

    let wrong_password = login(&client, &address, &username, "not-the-password").await;
    assert_eq!(wrong_password.status().as_u16(), 401);
    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();

    let unknown_user = login(&client, &address, "no.such.user0000", "password123").await;
    assert_eq!(unknown_user.status().as_u16(), 401);
    let unknown_user: serde_json::Value = unknown_user.json().await.unwrap();

    // No account enumeration: both failures look identical.
    assert_eq!(wrong_password["error"], unknown_user["error"]);
}

#[tokio::test]
async fn gated_routes_require_a_session() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/test/class11/jee", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(format!("{}/api/submit_test", address))
        .json(&serde_json::json!({ "answers": {} }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn sets_rotate_across_logins() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let mut assigned = Vec::new();
    for i in 0..5 {
        let phone = format!("900000010{}", i);
        let username = signup_student(&client, &address, &format!("Student Number{}", i), &phone).await;
        let body: serde_json::Value = login(&client, &address, &username, "password123")
            .await
            .json()
            .await
            .unwrap();
        assigned.push(body["assigned_set"].as_str().unwrap().to_string());
    }

    assert_eq!(assigned, vec!["a", "b", "c", "d", "a"]);
}

#[tokio::test]
async fn opening_the_test_twice_locks_exactly_once() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let username = signup_student(&client, &address, "Two Tabs", "9000000200").await;
    let body: serde_json::Value = login(&client, &address, &username, "password123")
        .await
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap();

    let first = client
        .get(format!("{}/test/class11/jee", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 200);

    // Same session, second tab: the lock is already taken.
    let second = client
        .get(format!("{}/test/class11/jee", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 403);
}

#[tokio::test]
async fn full_quiz_flow() {
    let dir = seed_question_dir();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    // Advance the allocator to index 2 so stud01 lands on set "c".
    for i in 0..2 {
        let phone = format!("900000030{}", i);
        let username = signup_student(&client, &address, &format!("Warmup Student{}", i), &phone).await;
        login(&client, &address, &username, "password123").await;
    }

    let username = signup_student(&client, &address, "Stud One", "9000000310").await;
    let body: serde_json::Value = login(&client, &address, &username, "password123")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["assigned_set"], "c");
    assert_eq!(body["test_path"], "/test/class11/jee");
    let token = body["token"].as_str().unwrap().to_string();
    let bearer = format!("Bearer {}", token);

    // Open the test: questions come back without the correct indices.
    let test: serde_json::Value = client
        .get(format!("{}/test/class11/jee", address))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(test["assigned_set"], "C");
    assert_eq!(test["test_duration_minutes"], 40);
    let questions = test["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    for q in questions {
        assert!(q.get("correct").is_none());
    }

    // Tab switches are counted without a state transition.
    let tab: serde_json::Value = client
        .post(format!("{}/api/log_tab_switch", address))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tab["tab_switches"], 1);
    assert_eq!(tab["threshold_exceeded"], false);

    // Correct answers for ids 0, 1 and 3; ids 2 and 4 left unanswered.
    let submit: serde_json::Value = client
        .post(format!("{}/api/submit_test", address))
        .header("Authorization", &bearer)
        .json(&serde_json::json!({
            "answers": { "0": 1, "1": 0, "3": 3 },
            "tab_switches": 1,
            "submission_type": "manual"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submit["success"], true);
    assert_eq!(submit["score"], 3);
    assert_eq!(submit["total"], 5);

    // Score view reflects the recorded result.
    let score: serde_json::Value = client
        .get(format!("{}/score", address))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(score["score"], 3);
    assert_eq!(score["total"], 5);
    assert_eq!(score["percentage"], 60.0);
    assert_eq!(score["scholarship_percent"], 25);
    assert_eq!(score["submission_type"], "manual");

    // A completed session hitting the test route is sent to the result view.
    let no_redirect = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let revisit = no_redirect
        .get(format!("{}/test/class11/jee", address))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap();
    assert_eq!(revisit.status().as_u16(), 303);
    assert_eq!(revisit.headers()["location"], "/score");

    // One attempt only: a fresh login with correct credentials is refused
    // with the explicit lockout message, not the credentials error.
    let relogin = login(&client, &address, &username, "password123").await;
    assert_eq!(relogin.status().as_u16(), 403);
    let relogin: serde_json::Value = relogin.json().await.unwrap();
    assert_eq!(
        relogin["error"],
        "You have already attempted the test. Only one attempt is allowed."
    );
}

#[tokio::test]
async fn missing_question_files_surface_as_no_content() {
    // Empty data dir: the allocator still issues from the fallback universe,
    // but the catalog has nothing to serve.
    let dir = std::env::temp_dir().join(format!("quiz-data-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let address = spawn_app(&dir).await;
    let client = reqwest::Client::new();

    let username = signup_student(&client, &address, "No Content", "9000000400").await;
    let body: serde_json::Value = login(&client, &address, &username, "password123")
        .await
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap();

    let response = client
        .get(format!("{}/test/class11/jee", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("No questions available"));
}
