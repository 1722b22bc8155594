//! Generative oracle trait and the Gemini implementation.
//! See ARCHITECTURE.md §3.1 and §3.2
//!
//! Three call shapes against the same generateContent endpoint:
//!   generate: text completion, optionally schema-constrained JSON
//!   speak:    text to speech (inline PCM audio)
//!   portrait: patient avatar image, degrading to a placeholder URL

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Inline payload decode error: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn wire_name(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One conversation turn as the oracle sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: TurnRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Model, text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<Turn>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// When set, the oracle is held to `application/json` output
    /// matching this schema.
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenResponse {
    pub text: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Synthesized speech, decoded from the inline base64 payload.
#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub audio: Vec<u8>,
    pub mime_type: String,
    pub voice: String,
    /// Model that rendered the clip, for the audit trail.
    pub model: String,
}

/// Patient portrait. Generation trouble is not an error here; the
/// caller always gets something to show.
#[derive(Debug, Clone)]
pub enum Avatar {
    Generated { bytes: Vec<u8>, mime_type: String, model: String },
    Placeholder { url: String },
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, req: GenRequest) -> Result<GenResponse, OracleError>;
    async fn speak(&self, text: &str, voice: Option<&str>) -> Result<SpeechClip, OracleError>;
    async fn portrait(&self, description: &str) -> Result<Avatar, OracleError>;
    fn model_id(&self) -> &str;
}

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, OracleError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await?;
    if status >= 400 {
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(OracleError::Api { status, message: msg });
    }
    Ok(body)
}

fn generate_body(req: &GenRequest) -> serde_json::Value {
    let contents: Vec<serde_json::Value> = req
        .turns
        .iter()
        .map(|t| {
            serde_json::json!({
                "role": t.role.wire_name(),
                "parts": [{ "text": t.text }]
            })
        })
        .collect();

    let mut generation_config = serde_json::json!({
        "maxOutputTokens": req.max_output_tokens.unwrap_or(4096),
        "temperature":     req.temperature.unwrap_or(0.1),
    });
    if let Some(schema) = &req.response_schema {
        generation_config["responseMimeType"] = serde_json::json!("application/json");
        generation_config["responseSchema"] = schema.clone();
    }

    let mut body = serde_json::json!({
        "contents": contents,
        "generationConfig": generation_config,
    });
    if let Some(sys) = &req.system_instruction {
        body["systemInstruction"] = serde_json::json!({
            "parts": [{ "text": sys }]
        });
    }
    body
}

// ── Google Gemini ─────────────────────────────────────────────────────────────

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VOICE: &str = "Kore";

pub struct GeminiBackend {
    pub model: String,
    pub tts_model: String,
    pub image_model: String,
    pub voice: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{API_BASE}/{}:generateContent?key={}", model, self.api_key)
    }

    fn placeholder_avatar() -> Avatar {
        Avatar::Placeholder {
            url: format!("https://picsum.photos/seed/{}/400/400", rand::random::<u32>()),
        }
    }

    async fn request_portrait(&self, prompt: &str) -> Result<Option<(Vec<u8>, String)>, OracleError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "imageConfig": { "aspectRatio": "1:1" }
            }
        });
        let resp = self
            .client
            .post(self.endpoint(&self.image_model))
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        if let Some(parts) = json["candidates"][0]["content"]["parts"].as_array() {
            for part in parts {
                if let Some(data) = part["inlineData"]["data"].as_str() {
                    let bytes = BASE64.decode(data)?;
                    let mime_type = part["inlineData"]["mimeType"]
                        .as_str()
                        .unwrap_or("image/png")
                        .to_string();
                    return Ok(Some((bytes, mime_type)));
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, req: GenRequest) -> Result<GenResponse, OracleError> {
        let body = generate_body(&req);
        let resp = self
            .client
            .post(self.endpoint(&self.model))
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string();
        let prompt_tokens = json["usageMetadata"]["promptTokenCount"]
            .as_u64()
            .unwrap_or(0) as u32;
        let completion_tokens = json["usageMetadata"]["candidatesTokenCount"]
            .as_u64()
            .unwrap_or(0) as u32;

        Ok(GenResponse {
            text,
            model: self.model.clone(),
            prompt_tokens,
            completion_tokens,
        })
    }

    async fn speak(&self, text: &str, voice: Option<&str>) -> Result<SpeechClip, OracleError> {
        let voice = voice.unwrap_or(&self.voice);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                }
            }
        });
        let resp = self
            .client
            .post(self.endpoint(&self.tts_model))
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let inline = &json["candidates"][0]["content"]["parts"][0]["inlineData"];
        let data = inline["data"].as_str().ok_or_else(|| {
            OracleError::Unavailable("speech response carried no audio payload".to_string())
        })?;
        let audio = BASE64.decode(data)?;
        // The TTS models answer with 24 kHz mono PCM16 unless told otherwise.
        let mime_type = inline["mimeType"]
            .as_str()
            .unwrap_or("audio/pcm;rate=24000")
            .to_string();

        Ok(SpeechClip {
            audio,
            mime_type,
            voice: voice.to_string(),
            model: self.tts_model.clone(),
        })
    }

    async fn portrait(&self, description: &str) -> Result<Avatar, OracleError> {
        let prompt = format!(
            "A realistic high-quality portrait of a hospital patient. {description}. \
             Plain hospital gown, medical setting background."
        );
        match self.request_portrait(&prompt).await {
            Ok(Some((bytes, mime_type))) => Ok(Avatar::Generated {
                bytes,
                mime_type,
                model: self.image_model.clone(),
            }),
            Ok(None) => Ok(Self::placeholder_avatar()),
            Err(e) => {
                tracing::warn!("portrait generation failed, using placeholder: {e}");
                Ok(Self::placeholder_avatar())
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
