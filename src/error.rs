use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use mongodb::error::ErrorKind;
use serde::Serialize;
use serde_json::json;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

/// The one failure kind of the admin service: any driver-level failure,
/// from connectivity to a rejected command.
#[derive(Debug, ThisError)]
#[error("MongoDB admin operation failed: {0}")]
pub struct MongoServiceError(#[from] mongodb::error::Error);

impl MongoServiceError {
    /// True when no server could be selected within the configured timeout.
    pub fn is_server_selection_timeout(&self) -> bool {
        matches!(self.0.kind.as_ref(), ErrorKind::ServerSelection { .. })
    }
}

#[derive(Debug, ThisError)]
pub enum BrokerError {
    #[error(transparent)]
    MongoService(#[from] MongoServiceError),

    #[error("Registry database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("service instance {0} already exists")]
    InstanceExists(String),

    #[error("service instance {0} does not exist")]
    InstanceMissing(String),

    #[error("service instance {0} is gone")]
    InstanceGone(String),

    #[error("service binding {0} already exists")]
    BindingExists(String),

    #[error("service binding {0} is gone")]
    BindingGone(String),

    #[error("service instance updates are not supported")]
    UpdateNotSupported,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<JsonRejection> for BrokerError {
    fn from(rejection: JsonRejection) -> Self {
        BrokerError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for BrokerError {
    fn from(rejection: QueryRejection) -> Self {
        BrokerError::InvalidRequest(rejection.body_text())
    }
}

impl BrokerError {
    pub fn status(&self) -> StatusCode {
        match self {
            BrokerError::InstanceExists(_) | BrokerError::BindingExists(_) => StatusCode::CONFLICT,
            BrokerError::InstanceMissing(_) => StatusCode::NOT_FOUND,
            BrokerError::InstanceGone(_) | BrokerError::BindingGone(_) => StatusCode::GONE,
            BrokerError::UpdateNotSupported => StatusCode::UNPROCESSABLE_ENTITY,
            BrokerError::InvalidRequest(_) | BrokerError::JsonError(_) => StatusCode::BAD_REQUEST,
            BrokerError::MongoService(e) if e.is_server_selection_timeout() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            BrokerError::MongoService(_)
            | BrokerError::DatabaseError(_)
            | BrokerError::UrlParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        // OSB answers 410 with an empty object.
        if matches!(
            self,
            BrokerError::InstanceGone(_) | BrokerError::BindingGone(_)
        ) {
            return (status, Json(json!({}))).into_response();
        }

        let body = match self {
            BrokerError::MongoService(ref e) if e.is_server_selection_timeout() => OsbErrorBody {
                error: "ServiceUnavailable".to_string(),
                description: "The MongoDB server is unreachable.".to_string(),
            },
            BrokerError::MongoService(_)
            | BrokerError::DatabaseError(_)
            | BrokerError::UrlParse(_) => OsbErrorBody {
                error: "InternalError".to_string(),
                description: "An internal broker error occurred.".to_string(),
            },
            BrokerError::UpdateNotSupported => OsbErrorBody {
                error: "UpdateNotSupported".to_string(),
                description: self.to_string(),
            },
            BrokerError::InstanceExists(_) | BrokerError::BindingExists(_) => OsbErrorBody {
                error: "Conflict".to_string(),
                description: self.to_string(),
            },
            BrokerError::InstanceMissing(_) => OsbErrorBody {
                error: "NotFound".to_string(),
                description: self.to_string(),
            },
            _ => OsbErrorBody {
                error: "BadRequest".to_string(),
                description: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Error body as defined by the Open Service Broker API.
#[derive(Debug, Serialize)]
pub struct OsbErrorBody {
    pub error: String,
    pub description: String,
}
