//! HTTP client for a Stable Diffusion web API (`/sdapi/v1/txt2img`).

use crate::ImageBackend;
use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::settings::ImageSettings;

#[derive(Debug, Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    steps: u32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

pub struct DiffusionClient {
    http: Client,
    base_url: String,
    steps: u32,
    width: u32,
    height: u32,
}

impl DiffusionClient {
    pub fn new(config: &ImageSettings) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .build()
                .context("failed to build HTTP client")?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            steps: config.steps,
            width: config.width,
            height: config.height,
        })
    }

    /// Render the first image the pipeline returns for `prompt`.
    pub async fn txt2img(&self, prompt: &str) -> Result<DynamicImage> {
        let url = format!("{}/sdapi/v1/txt2img", self.base_url);
        let req = Txt2ImgRequest {
            prompt,
            steps: self.steps,
            width: self.width,
            height: self.height,
        };
        tracing::debug!(url = %url, steps = self.steps, "diffusion request");
        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| anyhow!("image request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            return Err(anyhow!("image pipeline error {}: {}", status, snippet));
        }

        let body: Txt2ImgResponse = resp.json().await?;
        let encoded = body
            .images
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("image pipeline returned no images"))?;
        let bytes = BASE64
            .decode(encoded.trim())
            .context("image payload is not valid base64")?;
        image::load_from_memory(&bytes).context("image payload could not be decoded")
    }
}

#[async_trait::async_trait]
impl ImageBackend for DiffusionClient {
    async fn generate(&self, prompt: &str) -> Result<DynamicImage> {
        self.txt2img(prompt).await
    }
}
