/// Multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "image";
/// Older form markup posted the file as `imagem`.
const IMAGE_FIELD_ALIAS: &str = "imagem";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    MissingField,
    EmptyFilename,
    EmptyFile,
}

pub fn is_image_field(name: Option<&str>) -> bool {
    matches!(name, Some(IMAGE_FIELD) | Some(IMAGE_FIELD_ALIAS))
}

/// Validate the image part of an upload. `None` means the field was absent.
///
/// A rejected upload is not an error for the user; the handler just sends
/// them back to the form.
pub fn validate_upload(upload: Option<(Option<&str>, &[u8])>) -> Result<(), UploadRejection> {
    let Some((file_name, bytes)) = upload else {
        return Err(UploadRejection::MissingField);
    };
    if file_name.map_or(true, |n| n.trim().is_empty()) {
        return Err(UploadRejection::EmptyFilename);
    }
    if bytes.is_empty() {
        return Err(UploadRejection::EmptyFile);
    }
    Ok(())
}
