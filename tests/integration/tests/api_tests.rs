//! API Integration Tests
//!
//! Each test boots its own server on the in-memory backend, so no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, session_cookie, Auth, TestServer,
    ADMIN_EMAIL,
};
use reqwest::StatusCode;
use serde_json::json;

async fn submit(server: &TestServer, auth: Auth<'_>, request: &SubmitLeave) -> LeaveResponse {
    let response = server.post("/api/v1/leaves", auth, request).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn list(server: &TestServer, auth: Auth<'_>, query: &str) -> LeaveList {
    let response = server
        .get(&format!("/api/v1/leaves{query}"), auth)
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

fn decision(status: &str) -> serde_json::Value {
    json!({ "status": status })
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health", Auth::Anonymous).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready", Auth::Anonymous).await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_and_duplicate() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique("ada");

    let response = server
        .post("/api/v1/auth/register", Auth::Anonymous, &request)
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(auth.user.username, request.username);
    assert_eq!(auth.user.role, "EMPLOYEE");
    assert_eq!(auth.tokens.token_type, "Bearer");
    assert!(auth.tokens.expires_in > 0);

    let response = server
        .post("/api/v1/auth/register", Auth::Anonymous, &request)
        .await
        .unwrap();
    assert_error(response, StatusCode::CONFLICT, "EMAIL_ALREADY_EXISTS")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_register_validation() {
    let server = TestServer::start().await.unwrap();

    let mut request = RegisterRequest::unique("bob");
    request.email = "not-an-email".to_string();
    let response = server
        .post("/api/v1/auth/register", Auth::Anonymous, &request)
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        .await
        .unwrap();

    let mut request = RegisterRequest::unique("bob");
    request.password_confirm = "something else".to_string();
    let response = server
        .post("/api/v1/auth/register", Auth::Anonymous, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_login_sets_session_cookie_and_me_works_both_ways() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();

    for auth in [alice.bearer(), alice.session()] {
        let response = server.get("/api/v1/auth/me", auth).await.unwrap();
        let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
        assert_eq!(me.username, alice.user.username);
    }

    let response = server.get("/api/v1/auth/me", Auth::Anonymous).await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "AUTHENTICATION_REQUIRED")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();

    for (login, password) in [
        (alice.user.username.as_str(), "wrong-password"),
        ("nobody@example.com", "TestPass123!"),
    ] {
        let response = server
            .post(
                "/api/v1/auth/login",
                Auth::Anonymous,
                &LoginRequest {
                    login: login.to_string(),
                    password: password.to_string(),
                },
            )
            .await
            .unwrap();
        assert!(session_cookie(&response).is_none());
        assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();
    let body = json!({ "refresh_token": alice.refresh_token });

    let response = server
        .post("/api/v1/auth/token/refresh", Auth::Anonymous, &body)
        .await
        .unwrap();
    let rotated: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(rotated.tokens.refresh_token, alice.refresh_token);

    let response = server
        .post("/api/v1/auth/token/refresh", Auth::Anonymous, &body)
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/logout",
            Auth::Both {
                bearer: &alice.access_token,
                session: &alice.session_id,
            },
            &json!({ "refresh_token": alice.refresh_token }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get("/api/v1/auth/me", alice.session()).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/token/refresh",
            Auth::Anonymous,
            &json!({ "refresh_token": alice.refresh_token }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_change_password() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();

    let response = server
        .post(
            "/api/v1/auth/password",
            alice.bearer(),
            &json!({ "old_password": alice.password, "new_password": "another-secret" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    assert!(server
        .login(&alice.user.username, &alice.password)
        .await
        .is_err());
    server
        .login(&alice.user.username, "another-secret")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bearer_wins_over_session_and_bad_bearer_falls_back() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();
    let bob = server.employee("bob").await.unwrap();

    let response = server
        .get(
            "/api/v1/auth/me",
            Auth::Both {
                bearer: &alice.access_token,
                session: &bob.session_id,
            },
        )
        .await
        .unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.username, alice.user.username);

    let response = server
        .get(
            "/api/v1/auth/me",
            Auth::Both {
                bearer: "forged.token.value",
                session: &bob.session_id,
            },
        )
        .await
        .unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.username, bob.user.username);
}

#[tokio::test]
async fn test_oauth_unconfigured() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .get("/api/v1/auth/google/url", Auth::Anonymous)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .get("/api/v1/auth/google/callback?error=access_denied", Auth::Anonymous)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Role Tests
// ============================================================================

#[tokio::test]
async fn test_bootstrap_admin_is_superuser() {
    let server = TestServer::start().await.unwrap();
    let admin = server.admin().await.unwrap();
    assert_eq!(admin.user.email, ADMIN_EMAIL);
    assert!(admin.user.is_superuser);
    assert_eq!(admin.user.effective_role, "ADMIN");
}

#[tokio::test]
async fn test_only_admin_changes_roles() {
    let server = TestServer::start().await.unwrap();
    let manager = server.manager("mgr").await.unwrap();
    let alice = server.employee("alice").await.unwrap();

    let response = server
        .patch(
            &format!("/api/v1/users/{}/role", alice.user.id),
            manager.bearer(),
            &json!({ "role": "ADMIN" }),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE")
        .await
        .unwrap();

    let response = server
        .patch(
            "/api/v1/users/123/role",
            server.admin().await.unwrap().bearer(),
            &json!({ "role": "MANAGER" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Leave Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle() {
    let server = TestServer::start().await.unwrap();
    let employee = server.employee("akshay").await.unwrap();
    let manager = server.manager("priya").await.unwrap();

    // Employee files; their own handle is recorded even if they name someone else
    let leave = submit(
        &server,
        employee.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 6)).for_employee("Someone Else"),
    )
    .await;
    assert_eq!(leave.employee_name, employee.user.username);
    assert_eq!(leave.status, "PENDING");
    assert_eq!(leave.duration_days, 3);
    assert!(leave.is_editable && leave.is_cancellable);

    // Employee cannot decide
    let path = format!("/api/v1/leaves/{}/decision", leave.id);
    let response = server
        .post(&path, employee.bearer(), &decision("APPROVED"))
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE")
        .await
        .unwrap();

    // Manager approves
    let response = server
        .post(&path, manager.bearer(), &decision("APPROVED"))
        .await
        .unwrap();
    let approved: LeaveResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(approved.status, "APPROVED");
    assert!(!approved.is_editable);

    // A second decision is refused
    let response = server
        .post(&path, manager.bearer(), &decision("REJECTED"))
        .await
        .unwrap();
    assert_error(response, StatusCode::CONFLICT, "INVALID_STATE")
        .await
        .unwrap();

    // Owner may still cancel an approved leave, once
    let cancel = format!("/api/v1/leaves/{}/cancel", leave.id);
    let response = server.post_empty(&cancel, employee.session()).await.unwrap();
    let cancelled: LeaveResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cancelled.status, "CANCELLED");
    assert_eq!(
        cancelled.cancelled_by.as_deref(),
        Some(employee.user.username.as_str())
    );

    let response = server.post_empty(&cancel, employee.bearer()).await.unwrap();
    assert_error(response, StatusCode::CONFLICT, "INVALID_STATE")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_decision_must_be_approve_or_reject() {
    let server = TestServer::start().await.unwrap();
    let employee = server.employee("akshay").await.unwrap();
    let manager = server.manager("priya").await.unwrap();
    let leave = submit(
        &server,
        employee.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)),
    )
    .await;

    let response = server
        .post(
            &format!("/api/v1/leaves/{}/decision", leave.id),
            manager.bearer(),
            &decision("CANCELLED"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post(
            &format!("/api/v1/leaves/{}/decision", leave.id),
            Auth::Anonymous,
            &decision("APPROVED"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_edit_rules() {
    let server = TestServer::start().await.unwrap();
    let employee = server.employee("akshay").await.unwrap();
    let other = server.employee("ravi").await.unwrap();
    let admin = server.admin().await.unwrap();
    let leave = submit(
        &server,
        employee.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 6)),
    )
    .await;
    let path = format!("/api/v1/leaves/{}", leave.id);
    let change = json!({ "leave_type": "CASUAL", "start_date": "2024-03-10", "end_date": "2024-03-11" });

    // Neither another employee nor an admin may edit someone else's leave
    for intruder in [&other, &admin] {
        let response = server.patch(&path, intruder.bearer(), &change).await.unwrap();
        assert_error(response, StatusCode::FORBIDDEN, "NOT_LEAVE_OWNER")
            .await
            .unwrap();
    }

    let response = server
        .patch(
            &path,
            employee.bearer(),
            &json!({ "leave_type": "CASUAL", "start_date": "2024-03-12", "end_date": "2024-03-11" }),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_DATE_RANGE")
        .await
        .unwrap();

    let response = server.patch(&path, employee.bearer(), &change).await.unwrap();
    let edited: LeaveResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(edited.leave_type, "CASUAL");
    assert_eq!(edited.start_date, date(2024, 3, 10));
    assert_eq!(edited.employee_name, employee.user.username);
}

#[tokio::test]
async fn test_admin_cannot_cancel_for_others() {
    let server = TestServer::start().await.unwrap();
    let employee = server.employee("akshay").await.unwrap();
    let admin = server.admin().await.unwrap();
    let leave = submit(
        &server,
        employee.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)),
    )
    .await;

    let response = server
        .post_empty(&format!("/api/v1/leaves/{}/cancel", leave.id), admin.bearer())
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "NOT_LEAVE_OWNER")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_submit_validation() {
    let server = TestServer::start().await.unwrap();
    let manager = server.manager("priya").await.unwrap();

    // Privileged users must name the employee, and the name must be letters and spaces
    let response = server
        .post(
            "/api/v1/leaves",
            manager.bearer(),
            &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post(
            "/api/v1/leaves",
            manager.bearer(),
            &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)).for_employee("Akshay123"),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_EMPLOYEE_NAME")
        .await
        .unwrap();

    let response = server
        .post(
            "/api/v1/leaves",
            manager.bearer(),
            &SubmitLeave::sick(date(2024, 3, 5), date(2024, 3, 4)).for_employee("Akshay"),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_DATE_RANGE")
        .await
        .unwrap();

    let response = server
        .post(
            "/api/v1/leaves",
            manager.bearer(),
            &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4))
                .for_employee("Akshay")
                .of_type("VACATION"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let leave = submit(
        &server,
        manager.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)).for_employee("Akshay Kumar"),
    )
    .await;
    assert_eq!(leave.employee_name, "Akshay Kumar");
}

#[tokio::test]
async fn test_anonymous_submit_when_allowed() {
    let mut config = integration_tests::test_config();
    config.leave.allow_anonymous_submit = true;
    let server = TestServer::start_with_config(config).await.unwrap();

    let leave = submit(
        &server,
        Auth::Anonymous,
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)).for_employee("Walk In"),
    )
    .await;
    assert_eq!(leave.employee_name, "Walk In");

    // Anonymous callers still see nothing
    assert_eq!(list(&server, Auth::Anonymous, "").await.count, 0);
}

// ============================================================================
// Visibility, Filter and Stats Tests
// ============================================================================

#[tokio::test]
async fn test_visibility() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();
    let bob = server.employee("bob").await.unwrap();
    let manager = server.manager("mgr").await.unwrap();

    let mine = submit(
        &server,
        alice.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)),
    )
    .await;
    let theirs = submit(
        &server,
        bob.bearer(),
        &SubmitLeave::sick(date(2024, 4, 4), date(2024, 4, 4)),
    )
    .await;

    let own = list(&server, alice.bearer(), "").await;
    assert_eq!(own.ids(), vec![mine.id.as_str()]);

    let all = list(&server, manager.bearer(), "").await;
    assert_eq!(all.count, 2);
    // Default ordering is newest start date first
    assert_eq!(all.ids(), vec![theirs.id.as_str(), mine.id.as_str()]);

    assert_eq!(list(&server, Auth::Anonymous, "").await.count, 0);

    let response = server
        .get(&format!("/api/v1/leaves/{}", theirs.id), alice.bearer())
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get(&format!("/api/v1/leaves/{}", theirs.id), manager.session())
        .await
        .unwrap();
    let fetched: LeaveResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.id, theirs.id);
}

#[tokio::test]
async fn test_filters() {
    let server = TestServer::start().await.unwrap();
    let manager = server.manager("mgr").await.unwrap();

    for (name, leave_type, start) in [
        ("Akshay", "SICK", date(2024, 1, 10)),
        ("Akshara", "CASUAL", date(2024, 2, 10)),
        ("Ravi", "SICK", date(2024, 3, 10)),
    ] {
        submit(
            &server,
            manager.bearer(),
            &SubmitLeave::sick(start, start)
                .for_employee(name)
                .of_type(leave_type),
        )
        .await;
    }

    let names = |list: &LeaveList| {
        list.results
            .iter()
            .map(|r| r.employee_name.clone())
            .collect::<Vec<_>>()
    };

    let result = list(&server, manager.bearer(), "?Employee_Name__icontains=aks").await;
    assert_eq!(names(&result), vec!["Akshara", "Akshay"]);

    let result = list(&server, manager.bearer(), "?employee_name__contains=aks").await;
    assert_eq!(result.count, 0);

    let result = list(
        &server,
        manager.bearer(),
        "?leave_type=SICK&start_date__gte=2024-02-01",
    )
    .await;
    assert_eq!(names(&result), vec!["Ravi"]);

    let result = list(&server, manager.bearer(), "?search=RAV&ordering=start_date").await;
    assert_eq!(names(&result), vec!["Ravi"]);

    let result = list(&server, manager.bearer(), "?ordering=employee_name").await;
    assert_eq!(names(&result), vec!["Akshara", "Akshay", "Ravi"]);

    let response = server
        .get("/api/v1/leaves?start_date__gte=soon", manager.bearer())
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_stats() {
    let server = TestServer::start().await.unwrap();
    let alice = server.employee("alice").await.unwrap();
    let manager = server.manager("mgr").await.unwrap();

    let first = submit(
        &server,
        alice.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)),
    )
    .await;
    submit(
        &server,
        alice.bearer(),
        &SubmitLeave::sick(date(2024, 5, 4), date(2024, 5, 4)),
    )
    .await;
    submit(
        &server,
        manager.bearer(),
        &SubmitLeave::sick(date(2024, 6, 4), date(2024, 6, 4)).for_employee("Ravi"),
    )
    .await;

    let response = server
        .post(
            &format!("/api/v1/leaves/{}/decision", first.id),
            manager.bearer(),
            &decision("REJECTED"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/api/v1/leaves/stats", alice.bearer()).await.unwrap();
    let own: LeaveStats = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(
        own,
        LeaveStats {
            total: 2,
            pending: 1,
            approved: 0,
            rejected: 1,
            cancelled: 0
        }
    );

    let response = server
        .get("/api/v1/leaves/stats", manager.bearer())
        .await
        .unwrap();
    let all: LeaveStats = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.pending, 2);

    let response = server
        .get("/api/v1/leaves/stats", Auth::Anonymous)
        .await
        .unwrap();
    let none: LeaveStats = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn test_concurrent_decisions_single_winner() {
    let server = TestServer::start().await.unwrap();
    let employee = server.employee("akshay").await.unwrap();
    let manager = server.manager("priya").await.unwrap();
    let leave = submit(
        &server,
        employee.bearer(),
        &SubmitLeave::sick(date(2024, 3, 4), date(2024, 3, 4)),
    )
    .await;

    let path = format!("/api/v1/leaves/{}/decision", leave.id);
    let approve = decision("APPROVED");
    let reject = decision("REJECTED");
    let (a, b) = tokio::join!(
        server.post(&path, manager.bearer(), &approve),
        server.post(&path, manager.bearer(), &reject),
    );
    let mut statuses = [a.unwrap().status(), b.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
}
