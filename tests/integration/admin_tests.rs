//! Admin resource proxy integration tests.
//!
//! Tests verify:
//! - The `type` discriminator selects the backend collection
//! - Doctor listings carry both `id` and `doctor_id`
//! - Create/update/delete strip routing fields and pass backend answers through
//! - Credentials are forwarded to the backend
//! - Transport failures become stable 500 messages

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use medportal_gateway::error::BackendError;
use medportal_gateway::{create_router, RouterConfig};

use super::test_utils::{body_json, json_request, MockBackend};

const ADMIN_COOKIE: &str = "user_role=Admin";

fn config() -> RouterConfig {
    RouterConfig::new().with_tracing(false)
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, ADMIN_COOKIE)
        .body(Body::empty())
        .unwrap()
}

fn admin_delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::COOKIE, ADMIN_COOKIE)
        .body(Body::empty())
        .unwrap()
}

fn admin_json(method: Method, body: &Value) -> Request<Body> {
    let mut request = json_request(method, "/admin", body);
    request
        .headers_mut()
        .insert(header::COOKIE, ADMIN_COOKIE.parse().unwrap());
    request
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_doctors_normalizes_ids() {
    let backend = MockBackend::new().with_response(
        Method::GET,
        "admin/doctors",
        200,
        json!([
            {"id": "123456", "name": "Dr. A"},
            {"doctor_id": "654321", "name": "Dr. B"}
        ]),
    );
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_get("/admin?type=doctor"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let records = body.as_array().unwrap();
    for record in records {
        assert!(!record["id"].is_null());
        assert_eq!(record["id"], record["doctor_id"]);
    }
}

#[tokio::test]
async fn test_list_unknown_type_targets_hospitals() {
    let backend = MockBackend::new().with_response(
        Method::GET,
        "admin/hospitals",
        200,
        json!([{"id": 1, "name": "General", "region": "North", "status": "Active"}]),
    );
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_get("/admin?type=clinic"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(tracker.last_request().await.path, "admin/hospitals");
    let body = body_json(response).await;
    assert!(body[0].get("doctor_id").is_none());
}

#[tokio::test]
async fn test_list_requires_type() {
    let backend = MockBackend::new();
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router.oneshot(admin_get("/admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("type"));
    assert_eq!(tracker.request_count(), 0);
}

#[tokio::test]
async fn test_list_malformed_query_is_json_400() {
    let backend = MockBackend::new();
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_get("/admin?type=doctor&type=hospital"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("type"));
    assert_eq!(tracker.request_count(), 0);
}

#[tokio::test]
async fn test_delete_malformed_query_is_json_400() {
    let backend = MockBackend::new();
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_delete("/admin?type=doctor&id=1&id=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("id"));
    assert_eq!(tracker.request_count(), 0);
}

#[tokio::test]
async fn test_list_backend_down() {
    let router = create_router(MockBackend::new(), config());

    let response = router
        .oneshot(admin_get("/admin?type=doctor"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Failed to fetch doctors. Is the backend running?"
    );
}

#[tokio::test]
async fn test_list_backend_rejection_passed_through() {
    let backend = MockBackend::new().with_response(
        Method::GET,
        "admin/hospitals",
        403,
        json!({"detail": "Not allowed"}),
    );
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_get("/admin?type=hospital"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body, json!({"detail": "Not allowed"}));
}

#[tokio::test]
async fn test_credentials_forwarded() {
    let backend = MockBackend::new().with_response(
        Method::GET,
        "admin/doctors",
        200,
        json!([]),
    );
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let mut request = admin_get("/admin?type=doctor");
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer token-123".parse().unwrap());
    router.oneshot(request).await.unwrap();

    let forwarded = tracker.last_request().await.headers;
    assert_eq!(forwarded.authorization().unwrap(), "Bearer token-123");
    assert_eq!(forwarded.cookie().unwrap(), ADMIN_COOKIE);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_strips_type_and_passes_status() {
    let created = json!({"id": 7, "name": "General", "region": "North", "status": "Active"});
    let backend =
        MockBackend::new().with_response(Method::POST, "admin/hospitals", 201, created.clone());
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::POST,
            &json!({"type": "hospital", "name": "General", "region": "North"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, created);

    let request = tracker.last_request().await;
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "admin/hospitals");
    assert_eq!(
        request.body,
        Some(json!({"name": "General", "region": "North"}))
    );
}

#[tokio::test]
async fn test_create_conflict_passed_through() {
    let backend = MockBackend::new().with_response(
        Method::POST,
        "admin/doctors",
        409,
        json!({"detail": "Doctor ID already exists"}),
    );
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::POST,
            &json!({"type": "doctor", "id": "123456", "name": "Dr. A"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Doctor ID already exists");
}

#[tokio::test]
async fn test_create_backend_down() {
    let router = create_router(MockBackend::new(), config());

    let response = router
        .oneshot(admin_json(
            Method::POST,
            &json!({"type": "hospital", "name": "General"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to create hospital");
}

#[tokio::test]
async fn test_create_requires_type() {
    let router = create_router(MockBackend::new(), config());

    let response = router
        .oneshot(admin_json(Method::POST, &json!({"name": "General"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_doctor_by_doctor_id() {
    let updated = json!({"id": "123456", "name": "Dr. B"});
    let backend = MockBackend::new().with_response(
        Method::PUT,
        "admin/doctors/123456",
        200,
        updated.clone(),
    );
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::PUT,
            &json!({"type": "doctor", "doctorId": "123456", "name": "Dr. B"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, updated);

    let request = tracker.last_request().await;
    assert_eq!(request.body, Some(json!({"name": "Dr. B"})));
}

#[tokio::test]
async fn test_update_prefers_id_and_encodes_path() {
    let backend = MockBackend::new().with_response(
        Method::PUT,
        "admin/doctors/12%2034",
        200,
        json!({}),
    );
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::PUT,
            &json!({"type": "doctor", "id": "12 34", "doctorId": "999999", "status": "Inactive"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request = tracker.last_request().await;
    assert_eq!(request.path, "admin/doctors/12%2034");
    assert_eq!(request.body, Some(json!({"status": "Inactive"})));
}

#[tokio::test]
async fn test_update_hospital() {
    let backend = MockBackend::new().with_response(
        Method::PUT,
        "admin/hospitals/3",
        200,
        json!({"id": 3, "name": "Renamed"}),
    );
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::PUT,
            &json!({"type": "hospital", "id": 3, "name": "Renamed"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_requires_id() {
    let backend = MockBackend::new();
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::PUT,
            &json!({"type": "doctor", "name": "Dr. B"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(tracker.request_count(), 0);
}

#[tokio::test]
async fn test_update_not_found_passed_through() {
    let backend = MockBackend::new().with_response(
        Method::PUT,
        "admin/doctors/000000",
        404,
        json!({"detail": "Doctor not found"}),
    );
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::PUT,
            &json!({"type": "doctor", "id": "000000", "name": "X"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Doctor not found");
}

#[tokio::test]
async fn test_update_malformed_answer() {
    let backend = MockBackend::new().with_error(
        Method::PUT,
        "admin/doctors/123456",
        BackendError::Malformed {
            status: StatusCode::OK,
            message: "expected value".to_string(),
        },
    );
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_json(
            Method::PUT,
            &json!({"type": "doctor", "id": "123456", "name": "X"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to update doctor");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_doctor() {
    let backend = MockBackend::new().with_response(
        Method::DELETE,
        "admin/doctors/123456",
        200,
        json!({"detail": "Doctor deleted successfully"}),
    );
    let tracker = backend.tracker();
    let router = create_router(backend, config());

    let response = router
        .oneshot(admin_delete("/admin?type=doctor&doctorId=123456"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request = tracker.last_request().await;
    assert_eq!(request.method, Method::DELETE);
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_delete_requires_id() {
    let router = create_router(MockBackend::new(), config());

    let response = router
        .oneshot(admin_delete("/admin?type=hospital"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
