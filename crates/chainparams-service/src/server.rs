//! HTTP server for the chain-parameter API.

use crate::apis::pending::{AddPendingRequest, PendingStatusResponse, RefreshResponse};
use crate::apis::swap::SwapParamsRequest;
use crate::apis::APIError;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use chainparams_config::ApiConfig;
use chainparams_core::ChainParamsEngine;
use chainparams_types::{truncate_id, Chain, ChainSpecificParams, TransactionIntent};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<ChainParamsEngine>,
}

/// Builds the `/api` router.
pub fn router(engine: Arc<ChainParamsEngine>) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/params", post(handle_params))
				.route("/params/swap", post(handle_swap_params))
				.route("/pending", post(handle_add_pending))
				.route("/pending/refresh", post(handle_refresh_pending))
				.route("/pending/{chain}/{address}", get(handle_pending_status)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(AppState { engine })
}

/// Serves the API until the process is interrupted.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<ChainParamsEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("Chain-parameter API listening on {}", bind_address);

	axum::serve(listener, app).await?;
	Ok(())
}

/// Handles POST /api/params.
async fn handle_params(
	State(state): State<AppState>,
	Json(intent): Json<TransactionIntent>,
) -> Result<Json<ChainSpecificParams>, APIError> {
	match state.engine.resolve(&intent).await {
		Ok(params) => Ok(Json(params)),
		Err(e) => {
			tracing::warn!(chain = %intent.chain(), error = %e, "Parameter resolution failed");
			Err(APIError::from(e))
		},
	}
}

/// Handles POST /api/params/swap.
async fn handle_swap_params(
	State(state): State<AppState>,
	Json(request): Json<SwapParamsRequest>,
) -> Result<Json<ChainSpecificParams>, APIError> {
	let chain = request.coin.chain;
	match state
		.engine
		.resolve_swap(request.coin, request.is_deposit)
		.await
	{
		Ok(params) => Ok(Json(params)),
		Err(e) => {
			tracing::warn!(chain = %chain, error = %e, "Swap parameter resolution failed");
			Err(APIError::from(e))
		},
	}
}

/// Handles POST /api/pending.
async fn handle_add_pending(
	State(state): State<AppState>,
	Json(request): Json<AddPendingRequest>,
) -> Result<StatusCode, APIError> {
	request.validate()?;
	state.engine.add_pending_transaction(
		request.tx_hash,
		request.address,
		request.chain,
		request.sequence,
	);
	Ok(StatusCode::ACCEPTED)
}

/// Handles GET /api/pending/{chain}/{address}.
async fn handle_pending_status(
	State(state): State<AppState>,
	Path((chain, address)): Path<(String, String)>,
) -> Result<Json<PendingStatusResponse>, APIError> {
	let chain: Chain = chain
		.parse()
		.map_err(|e: chainparams_types::UnknownChain| {
			APIError::bad_request("INVALID_CHAIN", e.to_string())
		})?;
	tracing::debug!(chain = %chain, address = %truncate_id(&address), "Pending status requested");

	let oldest = state.engine.oldest_pending_transaction(&address, chain);
	Ok(Json(PendingStatusResponse::from(oldest)))
}

/// Handles POST /api/pending/refresh.
async fn handle_refresh_pending(State(state): State<AppState>) -> Json<RefreshResponse> {
	state.engine.force_check_pending_transactions().await;
	Json(RefreshResponse {
		pending: state.engine.tracker().pending_count(),
	})
}
