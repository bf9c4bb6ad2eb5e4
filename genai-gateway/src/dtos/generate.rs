use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct GenerateTextRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFromUrlRequest {
    pub image_url: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub result: String,
}
