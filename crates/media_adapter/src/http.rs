//! Cloudinary over HTTP.
//!
//! - Search API: JSON body, HTTP Basic auth (`api_key:api_secret`)
//! - Upload API (rename, destroy, tags, upload): signed form posts
//!
//! Non-2xx answers become [`AdapterError::Remote`] with the message from the
//! remote's `{"error": {"message": ...}}` body when there is one.

use crate::client::MediaApi;
use crate::error::{AdapterError, Result};
use crate::signing::SignedParams;
use crate::transformation::{delivery_url, Transformation};
use crate::types::{
    DestroyResult, RenameOptions, SearchQuery, SearchResult, TagCommand, TagResult, UploadParams,
};
use async_trait::async_trait;
use media_config::{Credentials, GateConfig, SignatureAlgorithm};
use serde_json::Value;
use tracing::{debug, warn};

pub struct CloudinaryClient {
    http: reqwest::Client,
    creds: Credentials,
    signature_algorithm: SignatureAlgorithm,
    api_base: String,
    res_base: String,
}

impl CloudinaryClient {
    pub fn new(config: &GateConfig, creds: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AdapterError::Http(e.to_string()))?;
        Ok(Self {
            http,
            creds,
            signature_algorithm: config.signature_algorithm,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            res_base: config.res_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1_1/{}/{}", self.api_base, self.creds.cloud_name, path)
    }

    async fn post_signed(&self, action: &str, params: SignedParams) -> Result<Value> {
        let params = params.set("timestamp", chrono::Utc::now().timestamp().to_string());
        let form = params.into_form(
            &self.creds.api_key,
            &self.creds.api_secret,
            self.signature_algorithm,
        );
        let url = self.endpoint(&format!("image/{action}"));
        debug!(%url, "upload api call");
        let resp = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;
        read_json(resp).await
    }
}

async fn read_json(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| AdapterError::Http(e.to_string()))?;
    if !status.is_success() {
        let err = remote_error(status.as_u16(), &body);
        warn!(status = status.as_u16(), "remote call failed: {err}");
        return Err(err);
    }
    Ok(serde_json::from_slice(&body)?)
}

fn remote_error(status: u16, body: &[u8]) -> AdapterError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .unwrap_or_else(|| format!("HTTP {status}"));
    AdapterError::Remote { status, message }
}

#[async_trait]
impl MediaApi for CloudinaryClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        let url = self.endpoint("resources/search");
        debug!(%url, expression = %query.expression, "search api call");
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.creds.api_key, Some(&self.creds.api_secret))
            .json(&query.to_body())
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;
        let value = read_json(resp).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn rename(&self, from: &str, to: &str, opts: RenameOptions) -> Result<Value> {
        let mut params = SignedParams::new()
            .set("from_public_id", from)
            .set("to_public_id", to);
        if opts.overwrite {
            params = params.set_flag("overwrite", true);
        }
        if opts.invalidate {
            params = params.set_flag("invalidate", true);
        }
        self.post_signed("rename", params).await
    }

    async fn destroy(&self, public_id: &str, invalidate: bool) -> Result<DestroyResult> {
        let mut params = SignedParams::new().set("public_id", public_id);
        if invalidate {
            params = params.set_flag("invalidate", true);
        }
        let value = self.post_signed("destroy", params).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn tags(
        &self,
        command: TagCommand,
        tag: Option<&str>,
        public_ids: &[String],
    ) -> Result<TagResult> {
        let mut params = SignedParams::new()
            .set("command", command.as_str())
            .set_list("public_ids", public_ids);
        if command.takes_tag() {
            if let Some(tag) = tag {
                params = params.set("tag", tag);
            }
        }
        let value = self.post_signed("tags", params).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn upload(&self, p: &UploadParams) -> Result<Value> {
        let mut params = SignedParams::new()
            .set("public_id", p.public_id.as_str())
            .set("file", p.file.as_str());
        if let Some(overwrite) = p.overwrite {
            params = params.set_flag("overwrite", overwrite);
        }
        if !p.tags.is_empty() {
            params = params.set("tags", p.tags.join(","));
        }
        self.post_signed("upload", params).await
    }

    fn url(&self, public_id: &str, transformation: &Transformation) -> Result<String> {
        Ok(delivery_url(
            &self.res_base,
            &self.creds.cloud_name,
            public_id,
            transformation,
        ))
    }
}
