use actix_web::{web, HttpResponse, Result};
use crate::api_error::ApiError;
use crate::http::governance_handler::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let engine = state.governance.engine();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "pending_proposals": engine.list_pending().len(),
        "signers": engine.signer_set().len(),
        "threshold": engine.threshold()
    })))
}
