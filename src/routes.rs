use crate::error_log::ErrorLog;
use crate::payload;
use crate::serializable_objects::{ErrorsResponse, TempPayload};
use crate::server_error::ServerError;
use crate::threshold::evaluate;
use actix_web::{HttpResponse, Result as ActixResult, delete, get, post, web};

/// Request bodies above this size are rejected before JSON decoding.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared state handed to every worker.
pub struct AppState {
    pub error_log: ErrorLog,
}

impl AppState {
    pub fn new(error_log: ErrorLog) -> Self {
        Self { error_log }
    }
}

/// Endpoint devices post their readings to.
/// The body is decoded by hand so that every failure gets the same JSON error,
/// whatever the Content-Type header says.
#[post("/temp")]
async fn add_temperature_data(
    data: web::Data<AppState>,
    body: web::Payload,
) -> ActixResult<HttpResponse> {
    let body = body
        .to_bytes_limited(MAX_BODY_BYTES)
        .await
        .map_err(|_| ServerError::bad_request(format!("body exceeds {MAX_BODY_BYTES} bytes")))?
        .map_err(|err| ServerError::bad_request(err.to_string()))?;

    let request: TempPayload =
        serde_json::from_slice(&body).map_err(|err| ServerError::bad_request(err.to_string()))?;

    let record = match payload::parse(&request.data) {
        Ok(record) => record,
        Err(err) => {
            log::warn!("Rejected payload {:?}: {}", request.data, err);
            if let Some(evicted) = data.error_log.append(request.data) {
                log::debug!("Error log full, evicted {:?}", evicted);
            }
            return Err(ServerError::bad_request(err.to_string()).into());
        }
    };

    Ok(HttpResponse::Ok().json(evaluate(&record)))
}

/// Returns every rejected payload in the order it was received.
#[get("/errors")]
async fn get_errors(data: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ErrorsResponse {
        errors: data.error_log.snapshot(),
    }))
}

#[delete("/errors")]
async fn delete_errors(data: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let removed = data.error_log.clear();
    log::info!("Cleared {} entries from the error log", removed);

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "success" })))
}

/// Registers all endpoints. `AppState` is expected as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_temperature_data)
        .service(get_errors)
        .service(delete_errors);
}
