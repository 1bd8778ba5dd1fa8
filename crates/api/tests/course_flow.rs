//! End-to-end flow through the HTTP layer against a real database: author a
//! course, enroll, complete lessons, review.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, get, get_auth, post_auth, post_json, post_json_auth};
use lms_api::auth::password::hash_password;
use lms_db::models::user::CreateUser;
use lms_db::repositories::UserRepo;
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PASSWORD: &str = "correct-horse-9";

async fn create_admin(pool: &PgPool) {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "admin@example.com".to_string(),
            password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
            first_name: "Site".to_string(),
            last_name: "Admin".to_string(),
            role: "admin".to_string(),
        },
    )
    .await
    .expect("admin creation should succeed");
}

async fn login(app: Router, email: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn register(app: Router, email: &str, role: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "email": email,
            "password": PASSWORD,
            "first_name": "Test",
            "last_name": role,
            "role": role
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn created_id(response: axum::response::Response) -> i64 {
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn lesson_body(title: &str, order_index: i32) -> Value {
    json!({
        "title": title,
        "content_type": "video",
        "content_url": "https://cdn.example.com/v.mp4",
        "order_index": order_index,
        "is_free": false
    })
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn author_enroll_complete_review(pool: PgPool) {
    create_admin(&pool).await;
    let app = common::build_test_app(pool);

    let admin = login(app.clone(), "admin@example.com").await;
    let category_id = created_id(
        post_json_auth(
            app.clone(),
            "/api/v1/categories",
            json!({ "name": "Programming" }),
            &admin,
        )
        .await,
    )
    .await;

    // Instructor authors a two-lesson course.
    let instructor = register(app.clone(), "teacher@example.com", "instructor").await;
    let course_id = created_id(
        post_json_auth(
            app.clone(),
            "/api/v1/courses",
            json!({
                "title": "Async Rust",
                "description": "Futures and executors",
                "category_id": category_id,
                "level": "intermediate",
                "duration_hours": 12,
                "price_cents": 1999
            }),
            &instructor,
        )
        .await,
    )
    .await;

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/courses/{course_id}/publish"),
        &instructor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "needs a section first");

    let section_id = created_id(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/courses/{course_id}/sections"),
            json!({ "title": "Basics", "order_index": 0 }),
            &instructor,
        )
        .await,
    )
    .await;
    let lesson_1 = created_id(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/sections/{section_id}/lessons"),
            lesson_body("Polling", 0),
            &instructor,
        )
        .await,
    )
    .await;
    let lesson_2 = created_id(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/sections/{section_id}/lessons"),
            lesson_body("Wakers", 1),
            &instructor,
        )
        .await,
    )
    .await;

    // Drafts are hidden from anonymous readers.
    let response = get(app.clone(), &format!("/api/v1/courses/{course_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/courses/{course_id}/publish"),
        &instructor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let course = body_json(response).await;
    assert_eq!(course["data"]["is_published"], true);
    assert_eq!(course["data"]["price_cents"], 1999);

    // Student enrolls and works through the course.
    let student = register(app.clone(), "learner@example.com", "student").await;

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/lessons/{lesson_1}/complete"),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "not enrolled yet");

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/enrollments/{course_id}"),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["status"], "active");

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/enrollments/{course_id}"),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/lessons/{lesson_1}/complete"),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["data"]["progress"], 50.0);
    assert_eq!(outcome["data"]["status"], "active");

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/courses/{course_id}/progress"),
        &student,
    )
    .await;
    assert_eq!(body_json(response).await["data"], 50.0);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/lessons/{lesson_2}/complete"),
        &student,
    )
    .await;
    let outcome = body_json(response).await;
    assert_eq!(outcome["data"]["progress"], 100.0);
    assert_eq!(outcome["data"]["status"], "completed");
    assert_eq!(outcome["data"]["course_completed"], true);

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/courses/{course_id}/last-lesson"),
        &student,
    )
    .await;
    assert_eq!(body_json(response).await["data"], lesson_2);

    // A completed course no longer accepts lesson completions.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/lessons/{lesson_1}/complete"),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Completed enrollments still count as enrolled.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/enrollments/{course_id}/check"),
        &student,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["enrolled"], true);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/reviews",
        json!({ "course_id": course_id, "rating": 5, "comment": "Great pacing" }),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/reviews",
        json!({ "course_id": course_id, "rating": 4 }),
        &student,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT, "one review per course");

    let response = get(
        app.clone(),
        &format!("/api/v1/reviews/course/{course_id}/rating"),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["average_rating"], 5.0);

    // The category now has a course and cannot be deleted.
    let response = common::delete_auth(
        app,
        &format!("/api/v1/categories/{category_id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn account_locks_after_repeated_failures(pool: PgPool) {
    create_admin(&pool).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let response = post_json(
            app.clone(),
            "/api/v1/auth/login",
            json!({ "email": "admin@example.com", "password": "wrong-password-1" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "admin@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_session(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "email": "Rotator@Example.com",
            "password": PASSWORD,
            "first_name": "Ro",
            "last_name": "Tator"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["email"], "rotator@example.com");
    assert_eq!(json["data"]["user"]["role"], "student");
    let refresh_token = json["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The old refresh token was revoked by the rotation.
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn review_for_unknown_course_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = register(app.clone(), "reviewer@example.com", "student").await;

    let response = post_json_auth(
        app,
        "/api/v1/reviews",
        json!({ "course_id": 424242, "rating": 4, "comment": "Where is it?" }),
        &student,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Course with id 424242 not found");
}
