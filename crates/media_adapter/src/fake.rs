//! Scripted in-memory [`MediaApi`] for tests: records every call and answers
//! with a configured reply, or a plausible success derived from the input.

use crate::client::MediaApi;
use crate::error::{AdapterError, Result};
use crate::transformation::{delivery_url, Transformation};
use crate::types::{
    DestroyResult, RenameOptions, SearchQuery, SearchResult, TagCommand, TagResult, UploadParams,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Search,
    Rename,
    Destroy,
    Tags,
    Upload,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Remote { status: u16, message: String },
    Transport(String),
}

impl Reply {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(SearchQuery),
    Rename { from: String, to: String, opts: RenameOptions },
    Destroy { public_id: String, invalidate: bool },
    Tags { command: TagCommand, tag: Option<String>, public_ids: Vec<String> },
    Upload(UploadParams),
    Url { public_id: String, transformation: String },
}

pub struct FakeMediaApi {
    cloud_name: String,
    replies: Mutex<HashMap<Op, Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeMediaApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeMediaApi {
    pub fn new() -> Self {
        Self {
            cloud_name: "demo".into(),
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn with_reply(self, op: Op, reply: Reply) -> Self {
        self.set_reply(op, reply);
        self
    }

    pub fn set_reply(&self, op: Op, reply: Reply) {
        self.replies.lock().unwrap().insert(op, reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that would have reached the network (URL building excluded).
    pub fn remote_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !matches!(c, Call::Url { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn answer(&self, op: Op, default: Value) -> Result<Value> {
        match self.replies.lock().unwrap().get(&op).cloned() {
            None => Ok(default),
            Some(Reply::Json(v)) => Ok(v),
            Some(Reply::Remote { status, message }) => Err(AdapterError::Remote { status, message }),
            Some(Reply::Transport(msg)) => Err(AdapterError::Http(msg)),
        }
    }
}

#[async_trait]
impl MediaApi for FakeMediaApi {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        self.record(Call::Search(query.clone()));
        let v = self.answer(Op::Search, json!({"total_count": 0, "resources": []}))?;
        Ok(serde_json::from_value(v)?)
    }

    async fn rename(&self, from: &str, to: &str, opts: RenameOptions) -> Result<Value> {
        self.record(Call::Rename {
            from: from.into(),
            to: to.into(),
            opts,
        });
        self.answer(Op::Rename, json!({"public_id": to}))
    }

    async fn destroy(&self, public_id: &str, invalidate: bool) -> Result<DestroyResult> {
        self.record(Call::Destroy {
            public_id: public_id.into(),
            invalidate,
        });
        let v = self.answer(Op::Destroy, json!({"result": "ok"}))?;
        Ok(serde_json::from_value(v)?)
    }

    async fn tags(
        &self,
        command: TagCommand,
        tag: Option<&str>,
        public_ids: &[String],
    ) -> Result<TagResult> {
        self.record(Call::Tags {
            command,
            tag: tag.map(str::to_string),
            public_ids: public_ids.to_vec(),
        });
        let v = self.answer(Op::Tags, json!({ "public_ids": public_ids }))?;
        Ok(serde_json::from_value(v)?)
    }

    async fn upload(&self, params: &UploadParams) -> Result<Value> {
        self.record(Call::Upload(params.clone()));
        self.answer(Op::Upload, json!({"public_id": params.public_id}))
    }

    fn url(&self, public_id: &str, transformation: &Transformation) -> Result<String> {
        self.record(Call::Url {
            public_id: public_id.into(),
            transformation: transformation.to_path(),
        });
        Ok(delivery_url(
            "https://res.cloudinary.com",
            &self.cloud_name,
            public_id,
            transformation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_tags_reply_echoes_input() {
        let api = FakeMediaApi::new();
        let ids = vec!["a".to_string(), "b".to_string()];
        let r = api.tags(TagCommand::Add, Some("t"), &ids).await.unwrap();
        assert_eq!(r.public_ids, ids);
        assert_eq!(api.remote_calls(), 1);
    }

    #[tokio::test]
    async fn scripted_failure_is_returned() {
        let api = FakeMediaApi::new().with_reply(Op::Rename, Reply::remote(404, "gone"));
        let err = api.rename("a", "b", RenameOptions::default()).await.unwrap_err();
        assert_eq!(err.remote_status(), Some(404));
    }
}
