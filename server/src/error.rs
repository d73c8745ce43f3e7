use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that reach the browser. Anything from the speech side never
/// gets here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Erro ao processar imagem: {0:#}")]
    Processing(anyhow::Error),

    #[error("Upload inválido: {0}")]
    Upload(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Processing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upload(e) => e.status(),
        };
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!("{}", message);
        } else {
            tracing::warn!("{}", message);
        }

        (status, message).into_response()
    }
}
