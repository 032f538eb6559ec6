use axum::http::StatusCode;
use schoolhub_auth::UserRole;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

mod common;
use common::{create_course, create_test_user, json_request, send, setup_test_app, token_for};

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_create_course_with_teacher(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let teacher = create_test_user(&pool, UserRole::Teacher).await;
    let app = setup_test_app(pool);

    let course = create_course(&app, &admin, "MATH101", Some(teacher.id)).await;

    assert_eq!(course["code"], "MATH101");
    assert_eq!(course["teacher_id"], teacher.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_duplicate_code(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool);
    create_course(&app, &admin, "HIST200", None).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/courses",
            Some(&token_for(&admin)),
            Some(json!({ "name": "History again", "code": "HIST200" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Course code already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_teacher_must_be_teacher(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/courses",
            Some(&token_for(&admin)),
            Some(json!({ "name": "Biology", "code": "BIO100", "teacher_id": student.id })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        format!("User {} is not a teacher", student.id)
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_create_course(pool: PgPool) {
    let teacher = create_test_user(&pool, UserRole::Teacher).await;
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/courses",
            Some(&token_for(&teacher)),
            Some(json!({ "name": "Art", "code": "ART100" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_courses_with_teacher_filter(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let teacher = create_test_user(&pool, UserRole::Teacher).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);

    create_course(&app, &admin, "CS101", Some(teacher.id)).await;
    create_course(&app, &admin, "CS102", Some(teacher.id)).await;
    create_course(&app, &admin, "PE100", None).await;

    let (status, body) = send(
        &app,
        json_request("GET", "/api/courses", Some(&token_for(&student)), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);

    let (status, body) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/courses?teacher_id={}", teacher.id),
            Some(&token_for(&student)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    let data = body["data"].as_array().unwrap();
    assert!(data.iter().all(|c| c["teacher_name"] == "Test teacher"));
    assert!(data.iter().all(|c| c["student_count"] == 0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_course_not_found(pool: PgPool) {
    let student = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/courses/{}", Uuid::new_v4()),
            Some(&token_for(&student)),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Course not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_and_delete_course(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool);
    let course = create_course(&app, &admin, "CHEM100", None).await;
    let uri = format!("/api/admin/courses/{}", course["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &uri,
            Some(&token_for(&admin)),
            Some(json!({ "name": "Organic Chemistry" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Organic Chemistry");
    assert_eq!(body["code"], "CHEM100");

    let (status, _) = send(
        &app,
        json_request("DELETE", &uri, Some(&token_for(&admin)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        json_request("DELETE", &uri, Some(&token_for(&admin)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_roster_and_grading_by_course_teacher(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let teacher = create_test_user(&pool, UserRole::Teacher).await;
    let other_teacher = create_test_user(&pool, UserRole::Teacher).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);

    let course = create_course(&app, &admin, "ENG101", Some(teacher.id)).await;
    let course_id = course["id"].as_str().unwrap();

    let (status, enrollment) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/enrollments/{}", course_id),
            Some(&token_for(&student)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let enrollment_id = enrollment["id"].as_str().unwrap();

    let (status, roster) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/courses/{}/students", course_id),
            Some(&token_for(&teacher)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let roster = roster.as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["student_id"], student.id.to_string());
    assert!(roster[0]["grade"].is_null());

    let grade_uri = format!(
        "/api/courses/{}/enrollments/{}/grade",
        course_id, enrollment_id
    );

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &grade_uri,
            Some(&token_for(&other_teacher)),
            Some(json!({ "grade": "F" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Only the course teacher or an admin can set grades"
    );

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &grade_uri,
            Some(&token_for(&teacher)),
            Some(json!({ "grade": "A-" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grade"], "A-");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grade_requires_enrollment_in_course(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let app = setup_test_app(pool);
    let course = create_course(&app, &admin, "GEO100", None).await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!(
                "/api/courses/{}/enrollments/{}/grade",
                course["id"].as_str().unwrap(),
                Uuid::new_v4()
            ),
            Some(&token_for(&admin)),
            Some(json!({ "grade": "B" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Enrollment not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_enroll_and_unenroll(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let parent = create_test_user(&pool, UserRole::Parent).await;
    let app = setup_test_app(pool);
    let course = create_course(&app, &admin, "MUS100", None).await;
    let course_id = course["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/admin/courses/{}/enrollments", course_id),
            Some(&token_for(&admin)),
            Some(json!({ "student_id": parent.id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("User {} is not a student", parent.id));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/admin/courses/{}/enrollments", course_id),
            Some(&token_for(&admin)),
            Some(json!({ "student_id": student.id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student_id"], student.id.to_string());

    let (status, body) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/courses/{}", course_id),
            Some(&token_for(&admin)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_count"], 1);

    let unenroll_uri = format!(
        "/api/admin/courses/{}/enrollments/{}",
        course_id, student.id
    );
    let (status, _) = send(
        &app,
        json_request("DELETE", &unenroll_uri, Some(&token_for(&admin)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        json_request("DELETE", &unenroll_uri, Some(&token_for(&admin)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Enrollment not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_set_grades(pool: PgPool) {
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let student = create_test_user(&pool, UserRole::Student).await;
    let app = setup_test_app(pool);
    let course = create_course(&app, &admin, "SOC100", None).await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!(
                "/api/courses/{}/enrollments/{}/grade",
                course["id"].as_str().unwrap(),
                Uuid::new_v4()
            ),
            Some(&token_for(&student)),
            Some(json!({ "grade": "A+" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden - teacher access required");
}
