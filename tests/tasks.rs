use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::json;
use sqlx::PgPool;

use taskdeck::auth::AuthMiddleware;
use taskdeck::config::Config;
use taskdeck::email::{Mailer, MockMailer};
use taskdeck::rate_limit::RateLimiter;
use taskdeck::routes;
use taskdeck::store::{TaskStore, UserStore};

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        server_port: 8080,
        server_host: "127.0.0.1".to_string(),
        admin_api_key: "integration-admin-key".to_string(),
        public_base_url: "http://127.0.0.1:8080".to_string(),
    }
}

/// Connects to the test database, or returns `None` (skipping the test) when
/// `DATABASE_URL` is not set.
async fn test_pool() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping DB-backed test");
            return None;
        }
    };
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    Some(
        PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test DB"),
    )
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! build_app {
    ($pool:expr) => {{
        let mailer: Arc<dyn Mailer> = Arc::new(MockMailer::new());
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new(UserStore::new($pool.clone())))
                .app_data(web::Data::new(TaskStore::new($pool.clone())))
                .app_data(web::Data::new(RateLimiter::for_login()))
                .app_data(web::Data::from(mailer))
                .wrap(AuthMiddleware)
                .service(routes::health::health)
                .configure(routes::config),
        )
        .await
    }};
}

/// Registers a user, logs in, and yields the session token.
macro_rules! session_token {
    ($app:expr, $username:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({
                "username": $username,
                "email": $email,
                "password": "Password123!"
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 201, "registration should succeed");

        let req = test::TestRequest::post()
            .uri("/users/auth/login")
            .set_json(json!({ "email": $email, "password": "Password123!" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200, "login should succeed");
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["token"].as_str().expect("session token").to_owned()
    }};
}

macro_rules! bearer {
    ($token:expr) => {
        ("Authorization", format!("Bearer {}", $token))
    };
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    dotenv::dotenv().ok();
    let Some(pool) = test_pool().await else { return };
    cleanup_user(&pool, "tasks@example.com").await;

    let app = build_app!(pool);
    let token = session_token!(app, "tasks_user", "tasks@example.com");

    // Create
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer!(token))
        .set_json(json!({
            "title": "Write the report",
            "detail": "Quarterly numbers",
            "status": "To Do"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let task: serde_json::Value = test::read_body_json(resp).await;
    let task_id = task["id"].as_str().unwrap().to_owned();
    assert_eq!(task["title"], "Write the report");
    assert_eq!(task["status"], "To Do");

    // Fetch it back
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // Update: move it along and give it a future due date
    let due = chrono::Utc::now() + chrono::Duration::days(7);
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(bearer!(token))
        .set_json(json!({
            "title": "Write the report",
            "detail": "Quarterly numbers",
            "status": "Doing",
            "due_date": due
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let updated: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(updated["status"], "Doing");

    // List shows it
    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let listed: Vec<serde_json::Value> = test::read_body_json(resp).await;
    assert!(listed.iter().any(|t| t["id"] == task_id.as_str()));

    // Status filter
    let req = test::TestRequest::get()
        .uri("/tasks?status=Doing")
        .insert_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let doing: Vec<serde_json::Value> = test::read_body_json(resp).await;
    assert!(doing.iter().all(|t| t["status"] == "Doing"));

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    cleanup_user(&pool, "tasks@example.com").await;
}

#[actix_rt::test]
async fn test_due_date_rule_applies_to_update_only() {
    dotenv::dotenv().ok();
    let Some(pool) = test_pool().await else { return };
    cleanup_user(&pool, "duedate@example.com").await;

    let app = build_app!(pool);
    let token = session_token!(app, "duedate_user", "duedate@example.com");

    // Creating with a past due date is accepted.
    let past = chrono::Utc::now() - chrono::Duration::days(1);
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer!(token))
        .set_json(json!({
            "title": "Backdated task",
            "status": "To Do",
            "due_date": past
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let task: serde_json::Value = test::read_body_json(resp).await;
    let task_id = task["id"].as_str().unwrap().to_owned();

    // Updating with a past due date is not.
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(bearer!(token))
        .set_json(json!({
            "title": "Backdated task",
            "status": "Doing",
            "due_date": past
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    cleanup_user(&pool, "duedate@example.com").await;
}

#[actix_rt::test]
async fn test_tasks_are_owner_scoped() {
    dotenv::dotenv().ok();
    let Some(pool) = test_pool().await else { return };
    cleanup_user(&pool, "owner-a@example.com").await;
    cleanup_user(&pool, "owner-b@example.com").await;

    let app = build_app!(pool);
    let token_a = session_token!(app, "owner_a", "owner-a@example.com");
    let token_b = session_token!(app, "owner_b", "owner-b@example.com");

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer!(token_a))
        .set_json(json!({ "title": "A's private task", "status": "To Do" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let task: serde_json::Value = test::read_body_json(resp).await;
    let task_id = task["id"].as_str().unwrap().to_owned();

    // Another user cannot see, update, or delete it; the task simply does not
    // exist for them.
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(bearer!(token_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(bearer!(token_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer!(token_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let listed: Vec<serde_json::Value> = test::read_body_json(resp).await;
    assert!(listed.iter().all(|t| t["id"] != task_id.as_str()));

    cleanup_user(&pool, "owner-a@example.com").await;
    cleanup_user(&pool, "owner-b@example.com").await;
}

#[actix_rt::test]
async fn test_task_validation_errors() {
    dotenv::dotenv().ok();
    let Some(pool) = test_pool().await else { return };
    cleanup_user(&pool, "taskval@example.com").await;

    let app = build_app!(pool);
    let token = session_token!(app, "taskval_user", "taskval@example.com");

    // Empty title
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer!(token))
        .set_json(json!({ "title": "", "status": "To Do" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Unknown status value is rejected at deserialization
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer!(token))
        .set_json(json!({ "title": "Valid", "status": "Someday" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());

    cleanup_user(&pool, "taskval@example.com").await;
}
