//! API error type and its mapping from resolution errors.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
use chainparams_adapters::{AdapterError, ClientError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds a client should wait before retrying after an upstream failure.
const RETRY_AFTER_SECS: u64 = 10;

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	#[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
	pub retry_after: Option<u64>,
}

/// Structured API error with its HTTP status.
#[derive(Debug, Error)]
pub enum APIError {
	/// Malformed or unsupported request (400)
	#[error("Bad Request: {message}")]
	BadRequest { error_type: String, message: String },
	/// The chain rejected or could not supply what the request needs (422)
	#[error("Unprocessable Entity: {message}")]
	UnprocessableEntity { error_type: String, message: String },
	/// The chain node was unreachable or too slow (503)
	#[error("Service Unavailable: {message}")]
	ServiceUnavailable {
		error_type: String,
		message: String,
		retry_after: Option<u64>,
	},
	/// Internal server error (500)
	#[error("Internal Server Error: {message}")]
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	pub fn bad_request(error_type: &str, message: impl Into<String>) -> Self {
		APIError::BadRequest {
			error_type: error_type.to_string(),
			message: message.into(),
		}
	}

	pub fn status_code(&self) -> StatusCode {
		match self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			APIError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
			APIError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
			}
			| APIError::UnprocessableEntity {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				retry_after: None,
			},
			APIError::ServiceUnavailable {
				error_type,
				message,
				retry_after,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				retry_after: *retry_after,
			},
		}
	}
}

impl From<AdapterError> for APIError {
	fn from(err: AdapterError) -> Self {
		let message = err.to_string();
		match err {
			AdapterError::UnsupportedChain(_) => APIError::BadRequest {
				error_type: "UNSUPPORTED_CHAIN".into(),
				message,
			},
			AdapterError::UnsupportedAction(_) => APIError::BadRequest {
				error_type: "UNSUPPORTED_ACTION".into(),
				message,
			},
			AdapterError::FailToGetAccountNumber
			| AdapterError::FailToGetSequenceNumber
			| AdapterError::FailToGetRecentBlockHash
			| AdapterError::FailToGetAssociatedTokenAddress
			| AdapterError::InvalidResponse(_) => APIError::UnprocessableEntity {
				error_type: "RESOLUTION_FAILED".into(),
				message,
			},
			AdapterError::Timeout(_) | AdapterError::Client(ClientError::Timeout) => {
				APIError::ServiceUnavailable {
					error_type: "TIMEOUT".into(),
					message,
					retry_after: Some(RETRY_AFTER_SECS),
				}
			},
			AdapterError::Client(_) => APIError::ServiceUnavailable {
				error_type: "NODE_UNAVAILABLE".into(),
				message,
				retry_after: Some(RETRY_AFTER_SECS),
			},
			AdapterError::ParamsMismatch { .. } => APIError::InternalServerError {
				error_type: "INTERNAL_ERROR".into(),
				message,
			},
		}
	}
}

impl IntoResponse for APIError {
	fn into_response(self) -> Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}
