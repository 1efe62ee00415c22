//! HTTP backend for the Gemini REST API

use super::backend::{GenerationBackend, ImageRequest, InlineAudio, SpeechRequest, TextRequest};
use super::config::GenAiConfig;
use crate::{MuseError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: Vec<&'a str>,
    speech_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    output_options: OutputOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions<'a> {
    mime_type: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PredictResponse {
    predictions: Vec<Prediction>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(self) -> Vec<ResponsePart> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(config: &GenAiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {} for {}", status, url);
            return Err(MuseError::Transport(format!("Gemini API error {}: {}", status, text)));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| MuseError::MalformedResponse(format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_text(&self, request: TextRequest) -> Result<String> {
        let body = GenerateContentRequest {
            contents: request
                .contents
                .iter()
                .map(|m| Content {
                    role: Some(m.role.as_str()),
                    parts: vec![TextPart { text: &m.content }],
                })
                .collect(),
            system_instruction: request.system_instruction.as_deref().map(|text| Content {
                role: None,
                parts: vec![TextPart { text }],
            }),
            generation_config: None,
        };

        debug!(
            "generateContent on {} with {} messages",
            request.model,
            request.contents.len()
        );
        let response: GenerateContentResponse = self
            .post_json(&self.model_url(&request.model, "generateContent"), &body)
            .await?;

        let texts: Vec<String> = response
            .first_parts()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if texts.is_empty() {
            return Err(MuseError::MalformedResponse("no text in response".into()));
        }
        Ok(texts.concat())
    }

    async fn generate_images(&self, request: ImageRequest) -> Result<Vec<Vec<u8>>> {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: &request.prompt,
            }],
            parameters: PredictParameters {
                sample_count: request.number_of_images,
                aspect_ratio: &request.aspect_ratio,
                output_options: OutputOptions {
                    mime_type: &request.mime_type,
                },
            },
        };

        debug!("predict on {}", request.model);
        let response: PredictResponse = self
            .post_json(&self.model_url(&request.model, "predict"), &body)
            .await?;

        response
            .predictions
            .into_iter()
            .filter_map(|p| p.bytes_base64_encoded)
            .map(|encoded| {
                general_purpose::STANDARD.decode(encoded).map_err(|e| {
                    MuseError::MalformedResponse(format!("image payload is not base64: {}", e))
                })
            })
            .collect()
    }

    async fn generate_speech(&self, request: SpeechRequest) -> Result<Vec<InlineAudio>> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![TextPart {
                    text: &request.text,
                }],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &request.voice_name,
                        },
                    },
                },
            }),
        };

        debug!("speech on {} with voice {}", request.model, request.voice_name);
        let response: GenerateContentResponse = self
            .post_json(&self.model_url(&request.model, "generateContent"), &body)
            .await?;

        Ok(response
            .first_parts()
            .into_iter()
            .filter_map(|part| part.inline_data)
            .map(|inline| InlineAudio {
                mime_type: inline.mime_type,
                data: inline.data,
            })
            .collect())
    }
}
