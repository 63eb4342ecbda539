use crate::api_error::ApiError;
use crate::governance::ProposalId;
use crate::models::{ActionPayload, Address};
use crate::service::governance_service::{CreateProposalDto, GovernanceService};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Application state containing the Governance Service
pub struct AppState {
    pub governance: GovernanceService,
}

// =============================================================================
// CREATE PROPOSAL
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    pub proposer: Address,
    pub action: ActionPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProposalResponse {
    pub proposal_id: ProposalId,
}

/// POST /api/governance/proposals
/// Create a pending proposal
pub async fn create_proposal(
    state: web::Data<AppState>,
    req: web::Json<CreateProposalRequest>,
) -> Result<impl Responder, ApiError> {
    let req = req.into_inner();
    info!(
        proposer = %req.proposer,
        kind = %req.action.kind(),
        "Received create proposal request"
    );

    let dto = CreateProposalDto {
        proposer: req.proposer,
        action: req.action,
    };
    let proposal_id = state.governance.create_proposal(dto)?;

    Ok(HttpResponse::Created().json(CreateProposalResponse { proposal_id }))
}

// =============================================================================
// LIST / GET PROPOSALS
// =============================================================================

/// GET /api/governance/proposals
/// Pending proposal ids, ascending
pub async fn list_pending(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    Ok(HttpResponse::Ok().json(state.governance.list_pending()))
}

/// GET /api/governance/proposals/:id
pub async fn get_proposal(
    state: web::Data<AppState>,
    path: web::Path<ProposalId>,
) -> Result<impl Responder, ApiError> {
    let proposal_id = path.into_inner();
    let record = state.governance.get_proposal(proposal_id)?;

    Ok(HttpResponse::Ok().json(record))
}

// =============================================================================
// SIGN PROPOSAL
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignProposalRequest {
    pub signer: Address,
}

/// POST /api/governance/proposals/:id/sign
pub async fn sign_proposal(
    state: web::Data<AppState>,
    path: web::Path<ProposalId>,
    req: web::Json<SignProposalRequest>,
) -> Result<impl Responder, ApiError> {
    let proposal_id = path.into_inner();

    info!(
        proposal_id,
        signer = %req.signer,
        "Received sign proposal request"
    );

    let receipt = state.governance.sign_proposal(proposal_id, &req.signer)?;

    Ok(HttpResponse::Ok().json(receipt))
}

// =============================================================================
// EXECUTE PROPOSAL
// =============================================================================

/// POST /api/governance/proposals/:id/execute
/// Open to any caller; the engine re-validates everything
pub async fn execute_proposal(
    state: web::Data<AppState>,
    path: web::Path<ProposalId>,
) -> Result<impl Responder, ApiError> {
    let proposal_id = path.into_inner();

    info!(proposal_id, "Received execute proposal request");

    let record = state.governance.execute_proposal(proposal_id)?;

    Ok(HttpResponse::Ok().json(record))
}

// =============================================================================
// SIGNATURES / SIGNERS
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HasSignedResponse {
    pub has_signed: bool,
}

/// GET /api/governance/proposals/:id/signatures/:signer
pub async fn has_signed(
    state: web::Data<AppState>,
    path: web::Path<(ProposalId, String)>,
) -> Result<impl Responder, ApiError> {
    let (proposal_id, signer) = path.into_inner();
    let has_signed = state
        .governance
        .has_signed(proposal_id, &Address::new(signer))?;

    Ok(HttpResponse::Ok().json(HasSignedResponse { has_signed }))
}

/// GET /api/governance/signers
/// Live signer set and the threshold it implies
pub async fn get_signers(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    Ok(HttpResponse::Ok().json(state.governance.signer_set()))
}

/// Configure Governance routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/governance")
            .route("/proposals", web::post().to(create_proposal))
            .route("/proposals", web::get().to(list_pending))
            .route("/proposals/{id}", web::get().to(get_proposal))
            .route("/proposals/{id}/sign", web::post().to(sign_proposal))
            .route("/proposals/{id}/execute", web::post().to(execute_proposal))
            .route(
                "/proposals/{id}/signatures/{signer}",
                web::get().to(has_signed),
            )
            .route("/signers", web::get().to(get_signers)),
    );
}
