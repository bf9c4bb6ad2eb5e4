use crate::dtos::{GenerateFromUrlRequest, GenerateTextRequest, GenerationResponse};
use crate::services::media;
use crate::services::payload::build_envelope;
use crate::services::providers::{GenerationInput, ProviderResponse};
use crate::services::StagedUpload;
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use service_core::error::AppError;

/// Multipart field carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the optional prompt.
const PROMPT_FIELD: &str = "prompt";

pub async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<GenerateTextRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let request = json_body(payload)?;

    let response = state
        .provider
        .generate(GenerationInput::Prompt(request.prompt))
        .await?;

    Ok(respond(state.provider.model(), response))
}

pub async fn generate_image_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let mut upload: Option<StagedUpload> = None;
    let mut prompt: Option<String> = None;

    // A request that is not multipart simply carries no image.
    if let Ok(mut multipart) = multipart {
        while let Some(mut field) = multipart.next_field().await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                // A blank file input arrives as `filename=""`; that is no file.
                Some(IMAGE_FIELD)
                    if field.file_name().is_some_and(|n| !n.is_empty()) && upload.is_none() =>
                {
                    let mut staged = state.uploads.create().await?;
                    while let Some(chunk) = field.chunk().await.map_err(|e| {
                        AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                    })? {
                        staged.write_chunk(&chunk).await?;
                    }
                    staged.finish().await?;

                    tracing::info!(size = staged.size(), "Image upload staged");
                    upload = Some(staged);
                }
                Some(PROMPT_FIELD) => {
                    prompt = Some(field.text().await.map_err(|e| {
                        AppError::BadRequest(anyhow::anyhow!("Failed to read prompt: {}", e))
                    })?);
                }
                _ => {}
            }
        }
    }

    let Some(upload) = upload else {
        return Err(AppError::bad_request("No image uploaded"));
    };

    let image = media::load_local(upload.path()).await?;
    let envelope = build_envelope(Some(image), prompt);

    let response = state
        .provider
        .generate(GenerationInput::Envelope(envelope))
        .await?;

    Ok(respond(state.provider.model(), response))
}

pub async fn generate_image_from_url(
    State(state): State<AppState>,
    payload: Result<Json<GenerateFromUrlRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let request = json_body(payload)?;

    let Some(image_url) = request.image_url.filter(|url| !url.is_empty()) else {
        return Err(AppError::bad_request("No imageUrl provided"));
    };

    let image = media::fetch_remote(&state.http_client, &image_url).await?;
    let envelope = build_envelope(Some(image), request.prompt);

    let response = state
        .provider
        .generate(GenerationInput::Envelope(envelope))
        .await?;

    Ok(respond(state.provider.model(), response))
}

/// Unwrap a JSON body. A request without a JSON content type is read as an
/// empty object, so missing inputs reach the handler's own validation.
fn json_body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

fn respond(model: &str, response: ProviderResponse) -> Json<GenerationResponse> {
    tracing::info!(
        model = %model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        finish_reason = ?response.finish_reason,
        "Generation completed"
    );

    Json(GenerationResponse {
        result: response.text,
    })
}
