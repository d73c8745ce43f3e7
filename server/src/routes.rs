use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::pipeline::UploadedImage;
use crate::render::{success_page, UPLOAD_FORM};
use crate::validation::{is_image_field, validate_upload};
use crate::AppState;

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

pub async fn upload_endpoint(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            debug!("Not a multipart upload ({rejection}), back to the form");
            return Ok(Redirect::to("/").into_response());
        }
    };

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if !is_image_field(field.name()) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        image = Some((file_name, bytes));
        break;
    }

    let checked = validate_upload(
        image
            .as_ref()
            .map(|(name, bytes)| (name.as_deref(), &bytes[..])),
    );
    let (file_name, bytes) = match (checked, image) {
        (Ok(()), Some((Some(name), bytes))) => (name, bytes),
        (rejection, _) => {
            info!("Upload rejected ({rejection:?}), back to the form");
            return Ok(Redirect::to("/").into_response());
        }
    };

    let pipeline = state.pipeline.clone();
    let caption = tokio::task::spawn_blocking(move || {
        pipeline.process(UploadedImage { file_name, bytes })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Upload worker failed: {e}")))?
    .map_err(ApiError::Processing)?;

    Ok(Html(success_page(&caption)).into_response())
}
