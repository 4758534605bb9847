use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::core::security::Role;
use crate::db::types::OptionLabel;
use crate::test_support;

#[tokio::test]
async fn student_takes_quiz_once_and_sees_result() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher = test_support::insert_teacher(db, "ada@example.com", "Ada", "teacher-pass").await;
    let student = test_support::insert_student(db, "sam@example.com", "Sam", "student-pass").await;
    let (quiz, questions) = test_support::insert_quiz(
        db,
        &teacher.id,
        "Geography",
        &[OptionLabel::B, OptionLabel::A],
    )
    .await;
    test_support::assign(db, &quiz.id, &[student.id.as_str()]).await;
    let token = test_support::bearer_token(&student.id, Role::Student, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/student/quizzes/{}", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("quiz for taking");

    let status = response.status();
    let taking = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {taking}");
    assert_eq!(taking["time_remaining"], 600);
    assert!(taking["questions"][0].get("correct_option").is_none());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/start", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("start quiz");

    let status = response.status();
    let started = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {started}");
    let remaining = started["time_remaining"].as_i64().expect("time remaining");
    assert!(remaining > 0 && remaining <= 600);

    let answers = json!({
        "answers": {
            questions[0].id.clone(): "b",
            questions[1].id.clone(): "c"
        }
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/attempt", quiz.id),
            Some(&token),
            Some(answers.clone()),
        ))
        .await
        .expect("submit attempt");

    let status = response.status();
    let submitted = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {submitted}");
    assert_eq!(submitted["already_attempted"], false);
    assert_eq!(submitted["score"], 50.0);
    assert_eq!(submitted["correct_count"], 1);
    let attempt_id = submitted["attempt_id"].as_str().expect("attempt id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/attempt", quiz.id),
            Some(&token),
            Some(answers),
        ))
        .await
        .expect("second submit");

    let status = response.status();
    let second = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {second}");
    assert_eq!(second["already_attempted"], true);
    assert_eq!(second["attempt_id"], attempt_id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/attempt", quiz.id),
            Some(&token),
            Some(json!({"answers": {questions[0].id.clone(): "e"}})),
        ))
        .await
        .expect("repeat submit with bad label");

    let status = response.status();
    let repeat = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {repeat}");
    assert_eq!(repeat["already_attempted"], true);
    assert_eq!(repeat["attempt_id"], attempt_id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/student/attempts/{attempt_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("attempt result");

    let status = response.status();
    let result = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {result}");
    assert_eq!(result["quiz_title"], "Geography");
    assert_eq!(result["correct_count"], 1);
    assert_eq!(result["total_questions"], 2);
    assert_eq!(result["answers"][0]["selected_option"], "b");
    assert_eq!(result["answers"][0]["is_correct"], true);
    assert_eq!(result["answers"][1]["selected_option"], "c");
    assert_eq!(result["answers"][1]["correct_option"], "a");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/student/quizzes/{}/time-remaining", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("time remaining");
    let body = test_support::read_json(response).await;
    assert_eq!(body["time_remaining"], 0);

    let teacher_token =
        test_support::bearer_token(&teacher.id, Role::Teacher, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/teacher/quizzes/{}/stats", quiz.id),
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("stats");

    let stats = test_support::read_json(response).await;
    assert_eq!(stats["total_attempts"], 1);
    assert_eq!(stats["average_score"], 50.0);
    assert_eq!(stats["questions"][0]["success_rate"], 100.0);
    assert_eq!(stats["questions"][1]["incorrect"], 1);
}

#[tokio::test]
async fn unassigned_student_is_forbidden() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher = test_support::insert_teacher(db, "ada@example.com", "Ada", "teacher-pass").await;
    let student = test_support::insert_student(db, "sam@example.com", "Sam", "student-pass").await;
    let (quiz, _) = test_support::insert_quiz(db, &teacher.id, "Closed", &[OptionLabel::A]).await;
    let token = test_support::bearer_token(&student.id, Role::Student, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/student/quizzes/{}", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("quiz detail");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/attempt", quiz.id),
            Some(&token),
            Some(json!({"answers": {}})),
        ))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/student/quizzes",
            Some(&token),
            None,
        ))
        .await
        .expect("assigned list");
    let list = test_support::read_json(response).await;
    assert!(list.as_array().expect("quiz list").is_empty());
}

#[tokio::test]
async fn label_outside_a_to_d_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher = test_support::insert_teacher(db, "ada@example.com", "Ada", "teacher-pass").await;
    let student = test_support::insert_student(db, "sam@example.com", "Sam", "student-pass").await;
    let (quiz, questions) =
        test_support::insert_quiz(db, &teacher.id, "Labels", &[OptionLabel::A]).await;
    test_support::assign(db, &quiz.id, &[student.id.as_str()]).await;
    let token = test_support::bearer_token(&student.id, Role::Student, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/attempt", quiz.id),
            Some(&token),
            Some(json!({"answers": {questions[0].id.clone(): "e"}})),
        ))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/attempt", quiz.id),
            Some(&token),
            Some(json!({"answers": {questions[0].id.clone(): " a"}})),
        ))
        .await
        .expect("submit padded label");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/student/attempts",
            Some(&token),
            None,
        ))
        .await
        .expect("attempt list");
    let list = test_support::read_json(response).await;
    assert!(list.as_array().expect("attempts").is_empty());
}

#[tokio::test]
async fn results_of_other_students_are_hidden() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher = test_support::insert_teacher(db, "ada@example.com", "Ada", "teacher-pass").await;
    let sam = test_support::insert_student(db, "sam@example.com", "Sam", "student-pass").await;
    let kim = test_support::insert_student(db, "kim@example.com", "Kim", "student-pass").await;
    let (quiz, _) = test_support::insert_quiz(db, &teacher.id, "Shared", &[OptionLabel::D]).await;
    test_support::assign(db, &quiz.id, &[sam.id.as_str(), kim.id.as_str()]).await;

    let sam_token = test_support::bearer_token(&sam.id, Role::Student, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/student/quizzes/{}/attempt", quiz.id),
            Some(&sam_token),
            Some(json!({"answers": {}})),
        ))
        .await
        .expect("submit");
    let status = response.status();
    let submitted = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {submitted}");
    assert_eq!(submitted["score"], 0.0);
    let attempt_id = submitted["attempt_id"].as_str().expect("attempt id").to_string();

    let kim_token = test_support::bearer_token(&kim.id, Role::Student, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/student/attempts/{attempt_id}"),
            Some(&kim_token),
            None,
        ))
        .await
        .expect("attempt result");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
