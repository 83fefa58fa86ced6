//! Admin resource proxy.
//!
//! The portal's admin screens manage two backend collections, doctors and
//! hospitals, through a single `/admin` route. The `type` discriminator
//! picks the collection; the backend's status and body are passed through.
//!
//! # Endpoints
//!
//! - `GET /admin?type=doctor|hospital` - List a collection
//! - `POST /admin` - Create a record (`type` in the body)
//! - `PUT /admin` - Update a record (`type` and `id` or `doctorId` in the body)
//! - `DELETE /admin?type=...&id=...` - Delete a record

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::handlers::{parse_json_object, AppState};
use crate::backend::{Backend, BackendRequest, ForwardedHeaders};
use crate::error::ProxyError;

/// Backend collection targeted by an admin request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Doctor,
    Hospital,
}

impl ResourceKind {
    /// `doctor` selects doctors; any other value selects hospitals.
    pub fn from_type(value: &str) -> Self {
        if value == "doctor" {
            ResourceKind::Doctor
        } else {
            ResourceKind::Hospital
        }
    }

    /// Collection path on the backend.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Doctor => "admin/doctors",
            ResourceKind::Hospital => "admin/hospitals",
        }
    }

    /// Path of a single record; `id` is percent-encoded.
    pub fn record(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), urlencoding::encode(id))
    }

    fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Doctor => "doctor",
            ResourceKind::Hospital => "hospital",
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Doctor => "doctors",
            ResourceKind::Hospital => "hospitals",
        }
    }
}

/// Query parameters for `GET` and `DELETE`.
#[derive(Debug, Default, Deserialize)]
pub struct AdminQueryParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub id: Option<String>,

    #[serde(rename = "doctorId")]
    pub doctor_id: Option<String>,
}

impl AdminQueryParams {
    fn kind(&self) -> Result<ResourceKind, ProxyError> {
        match self.kind.as_deref() {
            Some(kind) if !kind.is_empty() => Ok(ResourceKind::from_type(kind)),
            _ => Err(missing_type()),
        }
    }

    fn record_id(&self) -> Result<String, ProxyError> {
        [&self.id, &self.doctor_id]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
            .cloned()
            .ok_or_else(missing_id)
    }
}

/// Unwrap the query extractor, reporting a malformed query string as a `400`.
fn query_params(
    query: Result<Query<AdminQueryParams>, QueryRejection>,
) -> Result<AdminQueryParams, ProxyError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ProxyError::BadRequest(rejection.body_text()))
}

fn missing_type() -> ProxyError {
    ProxyError::BadRequest("Missing required field: type".to_string())
}

fn missing_id() -> ProxyError {
    ProxyError::BadRequest("Missing required field: id or doctorId".to_string())
}

/// Take the `type` discriminator out of a request body.
fn take_kind(body: &mut Map<String, Value>) -> Result<ResourceKind, ProxyError> {
    match body.remove("type") {
        Some(Value::String(kind)) if !kind.is_empty() => Ok(ResourceKind::from_type(&kind)),
        _ => Err(missing_type()),
    }
}

/// Take the record identifier out of a request body, preferring `id` over
/// `doctorId`. Both keys are removed either way.
fn take_record_id(body: &mut Map<String, Value>) -> Result<String, ProxyError> {
    let id = body.remove("id");
    let doctor_id = body.remove("doctorId");

    [id, doctor_id]
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(missing_id)
}

/// Ensure every doctor record carries both `id` and `doctor_id`.
pub fn normalize_doctor_ids(body: &mut Value) {
    let Some(records) = body.as_array_mut() else {
        return;
    };

    for record in records.iter_mut().filter_map(Value::as_object_mut) {
        let id = record.get("id").filter(|v| !v.is_null()).cloned();
        let doctor_id = record.get("doctor_id").filter(|v| !v.is_null()).cloned();

        match (id, doctor_id) {
            (Some(id), None) => {
                record.insert("doctor_id".to_string(), id);
            }
            (None, Some(doctor_id)) => {
                record.insert("id".to_string(), doctor_id);
            }
            _ => {}
        }
    }
}

fn passthrough(status: http::StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle `GET /admin?type=...`.
pub async fn admin_list_handler<B: Backend>(
    State(state): State<AppState<B>>,
    query: Result<Query<AdminQueryParams>, QueryRejection>,
    credentials: ForwardedHeaders,
) -> Result<Response, ProxyError> {
    let params = query_params(query)?;
    let kind = params.kind()?;
    let request = BackendRequest::get(kind.collection()).with_headers(credentials);

    let mut response = state.backend.send(request).await.map_err(|err| {
        ProxyError::from_backend(
            format!("Failed to fetch {}. Is the backend running?", kind.plural()),
            err,
        )
    })?;

    if kind == ResourceKind::Doctor {
        normalize_doctor_ids(&mut response.body);
    }

    Ok(passthrough(response.status, response.body))
}

/// Handle `POST /admin`. `type` is stripped before forwarding.
pub async fn admin_create_handler<B: Backend>(
    State(state): State<AppState<B>>,
    credentials: ForwardedHeaders,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let mut fields = parse_json_object(&body)?;
    let kind = take_kind(&mut fields)?;

    let request =
        BackendRequest::post(kind.collection(), Value::Object(fields)).with_headers(credentials);

    let response = state.backend.send(request).await.map_err(|err| {
        ProxyError::from_backend(format!("Failed to create {}", kind.singular()), err)
    })?;

    Ok(passthrough(response.status, response.body))
}

/// Handle `PUT /admin`. `type`, `id` and `doctorId` are stripped before
/// forwarding; the identifier moves into the backend path.
pub async fn admin_update_handler<B: Backend>(
    State(state): State<AppState<B>>,
    credentials: ForwardedHeaders,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let mut fields = parse_json_object(&body)?;
    let kind = take_kind(&mut fields)?;
    let id = take_record_id(&mut fields)?;

    let request =
        BackendRequest::put(kind.record(&id), Value::Object(fields)).with_headers(credentials);

    let response = state.backend.send(request).await.map_err(|err| {
        ProxyError::from_backend(format!("Failed to update {}", kind.singular()), err)
    })?;

    Ok(passthrough(response.status, response.body))
}

/// Handle `DELETE /admin?type=...&id=...`.
pub async fn admin_delete_handler<B: Backend>(
    State(state): State<AppState<B>>,
    query: Result<Query<AdminQueryParams>, QueryRejection>,
    credentials: ForwardedHeaders,
) -> Result<Response, ProxyError> {
    let params = query_params(query)?;
    let kind = params.kind()?;
    let id = params.record_id()?;

    let request = BackendRequest::delete(kind.record(&id)).with_headers(credentials);

    let response = state.backend.send(request).await.map_err(|err| {
        ProxyError::from_backend(format!("Failed to delete {}", kind.singular()), err)
    })?;

    Ok(passthrough(response.status, response.body))
}
