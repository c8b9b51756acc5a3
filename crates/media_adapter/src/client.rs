use crate::error::{AdapterError, Result};
use crate::transformation::Transformation;
use crate::types::{
    DestroyResult, RenameOptions, SearchQuery, SearchResult, TagCommand, TagResult, UploadParams,
};
use async_trait::async_trait;
use serde_json::Value;

/// The remote operations the gate needs, and nothing more.
#[async_trait]
pub trait MediaApi: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult>;

    /// Returns the renamed resource as reported by the remote.
    async fn rename(&self, from: &str, to: &str, opts: RenameOptions) -> Result<Value>;

    async fn destroy(&self, public_id: &str, invalidate: bool) -> Result<DestroyResult>;

    /// `tag` is ignored for [`TagCommand::RemoveAll`].
    async fn tags(
        &self,
        command: TagCommand,
        tag: Option<&str>,
        public_ids: &[String],
    ) -> Result<TagResult>;

    async fn upload(&self, params: &UploadParams) -> Result<Value>;

    /// Delivery URL; computed locally, no network.
    fn url(&self, public_id: &str, transformation: &Transformation) -> Result<String>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Stand-in used when the gate starts without credentials in development.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

const NOT_CONFIGURED: &str = "Cloudinary credentials are not set";

#[async_trait]
impl MediaApi for Unconfigured {
    async fn search(&self, _query: &SearchQuery) -> Result<SearchResult> {
        Err(AdapterError::NotConfigured(NOT_CONFIGURED.into()))
    }

    async fn rename(&self, _from: &str, _to: &str, _opts: RenameOptions) -> Result<Value> {
        Err(AdapterError::NotConfigured(NOT_CONFIGURED.into()))
    }

    async fn destroy(&self, _public_id: &str, _invalidate: bool) -> Result<DestroyResult> {
        Err(AdapterError::NotConfigured(NOT_CONFIGURED.into()))
    }

    async fn tags(
        &self,
        _command: TagCommand,
        _tag: Option<&str>,
        _public_ids: &[String],
    ) -> Result<TagResult> {
        Err(AdapterError::NotConfigured(NOT_CONFIGURED.into()))
    }

    async fn upload(&self, _params: &UploadParams) -> Result<Value> {
        Err(AdapterError::NotConfigured(NOT_CONFIGURED.into()))
    }

    fn url(&self, _public_id: &str, _transformation: &Transformation) -> Result<String> {
        Err(AdapterError::NotConfigured(NOT_CONFIGURED.into()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_refuses_everything() {
        let api = Unconfigured;
        assert!(!api.is_configured());
        assert!(matches!(
            api.search(&SearchQuery::new("")).await,
            Err(AdapterError::NotConfigured(_))
        ));
        assert!(matches!(
            api.tags(TagCommand::Add, Some("t"), &["a".into()]).await,
            Err(AdapterError::NotConfigured(_))
        ));
        assert!(api.url("sample", &Transformation::none()).is_err());
    }
}
