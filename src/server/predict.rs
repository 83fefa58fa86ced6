//! Prediction proxy.
//!
//! `POST /predict` forwards the patient record to the backend model. When the
//! model cannot answer (unreachable, rejection, or a malformed body) the
//! gateway substitutes a placeholder from [`MockPredictor`] so the portal
//! keeps working. The `X-Prediction-Source` header tells the two apart.
//!
//! [`MockPredictor`]: crate::predict::MockPredictor

use axum::{
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, warn};

use super::handlers::{parse_json_object, AppState};
use crate::backend::{Backend, BackendRequest, ForwardedHeaders};
use crate::error::ProxyError;
use crate::predict::{normalize, Prediction, PredictionSource};

/// Header reporting whether a prediction is live or a placeholder.
pub const PREDICTION_SOURCE_HEADER: &str = "x-prediction-source";

/// Handle `POST /predict`.
///
/// # Response
///
/// `200 OK` with `{resistant, probability}` in every case except a body that
/// is not a JSON object, which yields `400`.
pub async fn predict_handler<B: Backend>(
    State(state): State<AppState<B>>,
    credentials: ForwardedHeaders,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let record = Value::Object(parse_json_object(&body)?);

    let request = BackendRequest::post("predict", record.clone()).with_headers(credentials);

    let (prediction, source) = match state.backend.send(request).await {
        Ok(response) => {
            debug!(status = response.status.as_u16(), "Live prediction");
            (normalize(&response.body), PredictionSource::Live)
        }
        Err(err) => {
            warn!(error = %err, "Prediction backend failed, using placeholder prediction");
            (state.predictor.predict(&record), PredictionSource::Mock)
        }
    };

    Ok(prediction_response(prediction, source))
}

fn prediction_response(prediction: Prediction, source: PredictionSource) -> Response {
    let mut response = Json(prediction).into_response();
    response.headers_mut().insert(
        PREDICTION_SOURCE_HEADER,
        HeaderValue::from_static(source.as_str()),
    );
    response
}
