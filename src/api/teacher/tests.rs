use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::core::security::Role;
use crate::db::types::OptionLabel;
use crate::test_support;

#[tokio::test]
async fn teacher_generates_assembles_and_lists_quiz() {
    let ctx = test_support::setup_test_context().await;
    let teacher =
        test_support::insert_teacher(ctx.state.db(), "ada@example.com", "Ada", "teacher-pass")
            .await;
    let token = test_support::bearer_token(&teacher.id, Role::Teacher, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/teacher/quizzes/generate/text",
            Some(&token),
            Some(json!({
                "text_content": "Photosynthesis turns light into chemical energy.",
                "difficulty": "easy",
                "question_count": 3
            })),
        ))
        .await
        .expect("generate");

    let status = response.status();
    let generated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {generated}");
    assert_eq!(generated["origin"], "fallback");
    assert_eq!(generated["question_count"], 3);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/teacher/quizzes",
            Some(&token),
            Some(json!({
                "title": "Biology basics",
                "difficulty": "easy",
                "time_limit": 15,
                "questions": generated["questions"].clone()
            })),
        ))
        .await
        .expect("create quiz");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    let quiz_id = created["id"].as_str().expect("quiz id").to_string();
    let positions: Vec<i64> = created["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .map(|question| question["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(
        created["questions"][0]["question_text"],
        generated["questions"][0]["question_text"]
    );

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/teacher/quizzes",
            Some(&token),
            None,
        ))
        .await
        .expect("list quizzes");

    let status = response.status();
    let list = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {list}");
    let items = list.as_array().expect("quiz list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], quiz_id);
    assert_eq!(items[0]["question_count"], 3);
    assert_eq!(items[0]["attempt_count"], 0);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/teacher/quizzes/{quiz_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("quiz detail");

    let status = response.status();
    let detail = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {detail}");
    assert_eq!(detail["time_limit_minutes"], 15);
    assert!(detail["questions"][0]["correct_option"].is_string());
    assert!(detail["attempts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn quiz_without_questions_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let teacher =
        test_support::insert_teacher(ctx.state.db(), "ada@example.com", "Ada", "teacher-pass")
            .await;
    let token = test_support::bearer_token(&teacher.id, Role::Teacher, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/teacher/quizzes",
            Some(&token),
            Some(json!({"title": "Empty", "time_limit_minutes": 10, "questions": []})),
        ))
        .await
        .expect("create quiz");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_without_extractable_text_falls_back() {
    let ctx = test_support::setup_test_context().await;
    let teacher =
        test_support::insert_teacher(ctx.state.db(), "ada@example.com", "Ada", "teacher-pass")
            .await;
    let token = test_support::bearer_token(&teacher.id, Role::Teacher, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            "/api/v1/teacher/quizzes/generate/file",
            &token,
            "notes.txt",
            b"   ",
            &[("question_count", "2"), ("difficulty", "hard")],
        ))
        .await
        .expect("generate from file");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["origin"], "fallback");
    assert_eq!(body["questions"].as_array().unwrap().len(), 2);

    let response = ctx
        .app
        .oneshot(test_support::multipart_request(
            "/api/v1/teacher/quizzes/generate/file",
            &token,
            "malware.exe",
            b"MZ",
            &[],
        ))
        .await
        .expect("generate from file");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reassignment_replaces_previous_set() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher = test_support::insert_teacher(db, "ada@example.com", "Ada", "teacher-pass").await;
    let s1 = test_support::insert_student(db, "s1@example.com", "One", "student-pass").await;
    let s2 = test_support::insert_student(db, "s2@example.com", "Two", "student-pass").await;
    let s3 = test_support::insert_student(db, "s3@example.com", "Three", "student-pass").await;
    let (quiz, _) =
        test_support::insert_quiz(db, &teacher.id, "Fractions", &[OptionLabel::A]).await;
    let token = test_support::bearer_token(&teacher.id, Role::Teacher, ctx.state.settings());
    let uri = format!("/api/v1/teacher/quizzes/{}/assignments", quiz.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"student_ids": [&s1.id, &s2.id]})),
        ))
        .await
        .expect("first assignment");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"student_ids": [&s2.id, &s3.id, &s3.id, "no-such-student"]})),
        ))
        .await
        .expect("second assignment");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    let mut assigned: Vec<String> = body["students"]
        .as_array()
        .expect("students")
        .iter()
        .map(|student| student["id"].as_str().unwrap().to_string())
        .collect();
    assigned.sort();
    let mut expected = vec![s2.id.clone(), s3.id.clone()];
    expected.sort();
    assert_eq!(assigned, expected);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&token), None))
        .await
        .expect("list assignments");
    let body = test_support::read_json(response).await;
    assert_eq!(body["students"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stats_are_zero_without_attempts() {
    let ctx = test_support::setup_test_context().await;
    let teacher =
        test_support::insert_teacher(ctx.state.db(), "ada@example.com", "Ada", "teacher-pass")
            .await;
    let (quiz, _) = test_support::insert_quiz(
        ctx.state.db(),
        &teacher.id,
        "Algebra",
        &[OptionLabel::A, OptionLabel::B],
    )
    .await;
    let token = test_support::bearer_token(&teacher.id, Role::Teacher, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/teacher/quizzes/{}/stats", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("stats");

    let status = response.status();
    let stats = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {stats}");
    assert_eq!(stats["total_attempts"], 0);
    assert_eq!(stats["average_score"], 0.0);
    assert_eq!(stats["highest_score"], 0.0);
    assert_eq!(stats["lowest_score"], 0.0);
    let questions = stats["questions"].as_array().expect("question stats");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["success_rate"], 0.0);
}

#[tokio::test]
async fn other_teachers_quiz_is_forbidden() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let owner = test_support::insert_teacher(db, "ada@example.com", "Ada", "teacher-pass").await;
    let other = test_support::insert_teacher(db, "bob@example.com", "Bob", "teacher-pass").await;
    let (quiz, _) = test_support::insert_quiz(db, &owner.id, "Private", &[OptionLabel::C]).await;
    let token = test_support::bearer_token(&other.id, Role::Teacher, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/teacher/quizzes/{}", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("quiz detail");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/teacher/quizzes/missing-quiz",
            Some(&token),
            None,
        ))
        .await
        .expect("missing quiz");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_token_cannot_use_teacher_routes() {
    let ctx = test_support::setup_test_context().await;
    let student =
        test_support::insert_student(ctx.state.db(), "s1@example.com", "Student", "student-pass")
            .await;
    let token = test_support::bearer_token(&student.id, Role::Student, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/teacher/quizzes",
            Some(&token),
            None,
        ))
        .await
        .expect("list quizzes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
