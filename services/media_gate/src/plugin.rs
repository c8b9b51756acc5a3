//! Gate operations. Each one extracts its arguments (failing before any
//! remote call when a required one is missing), makes one call through
//! [`MediaApi`], and normalizes the answer.

use crate::cardinality::check_cardinality;
use crate::error::GateError;
use crate::extract::RequestArgs;
use media_adapter::{
    MediaApi, RenameOptions, SearchQuery, SortDirection, TagCommand, Transformation, UploadParams,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

type Result<T> = std::result::Result<T, GateError>;

#[derive(Clone)]
pub struct MediaPlugin {
    api: Arc<dyn MediaApi>,
}

impl MediaPlugin {
    pub fn new(api: Arc<dyn MediaApi>) -> Self {
        Self { api }
    }

    pub fn is_configured(&self) -> bool {
        self.api.is_configured()
    }

    /// Secure URLs of the matching assets, or the raw result page when `raw`
    /// is set. No expression means every asset.
    pub async fn search(&self, args: &RequestArgs) -> Result<Value> {
        let query = search_query(args)?;
        let raw = args.optional_bool("raw")?.unwrap_or(false);
        info!(expression = %query.expression, raw, "search");

        let result = self.api.search(&query).await.map_err(remote_failure)?;
        if raw {
            return serde_json::to_value(result)
                .map_err(|e| GateError::Internal(format!("encode search result: {e}")));
        }
        Ok(json!(result.secure_urls()))
    }

    pub async fn transform(&self, args: &RequestArgs) -> Result<Value> {
        let public_id = args.required_str("public_id")?;
        let transformation = Transformation::from_value(args.required_value("transformation")?)?;
        info!(%public_id, transformation = %transformation.to_path(), "transform");
        let url = self.api.url(&public_id, &transformation)?;
        Ok(Value::String(url))
    }

    pub async fn rename(&self, args: &RequestArgs) -> Result<Value> {
        let from = args.required_str("from_public_id")?;
        let to = args.required_str("to_public_id")?;
        let opts = RenameOptions {
            overwrite: args.optional_bool("overwrite")?.unwrap_or(false),
            invalidate: args.optional_bool("invalidate")?.unwrap_or(false),
        };
        info!(%from, %to, "rename");
        self.api
            .rename(&from, &to, opts)
            .await
            .map_err(remote_failure)
    }

    pub async fn destroy(&self, args: &RequestArgs) -> Result<Value> {
        let public_id = args.required_str("public_id")?;
        let invalidate = args.optional_bool("invalidate")?.unwrap_or(false);
        info!(%public_id, "destroy");

        let result = self
            .api
            .destroy(&public_id, invalidate)
            .await
            .map_err(remote_failure)?;
        // The remote signals a missing asset inside a 200 answer.
        if result.is_not_found() {
            return Err(GateError::NotFound(format!("asset \"{public_id}\" not found")));
        }
        Ok(json!({ "result": result.result }))
    }

    pub async fn add_tag(&self, args: &RequestArgs) -> Result<Value> {
        self.tag(TagCommand::Add, args).await
    }

    pub async fn remove_tag(&self, args: &RequestArgs) -> Result<Value> {
        self.tag(TagCommand::Remove, args).await
    }

    pub async fn replace_tag(&self, args: &RequestArgs) -> Result<Value> {
        self.tag(TagCommand::Replace, args).await
    }

    pub async fn remove_all_tags(&self, args: &RequestArgs) -> Result<Value> {
        self.tag(TagCommand::RemoveAll, args).await
    }

    async fn tag(&self, command: TagCommand, args: &RequestArgs) -> Result<Value> {
        let tag = if command.takes_tag() {
            Some(args.required_str("tag")?)
        } else {
            None
        };
        let public_ids = args.required_list("public_ids")?;
        info!(%command, tag = tag.as_deref().unwrap_or(""), count = public_ids.len(), "tags");

        let result = self
            .api
            .tags(command, tag.as_deref(), &public_ids)
            .await
            .map_err(remote_failure)?;
        check_cardinality(&public_ids, &result.public_ids)?;
        Ok(json!({ "public_ids": result.public_ids }))
    }

    pub async fn upload(&self, args: &RequestArgs) -> Result<Value> {
        let params = UploadParams {
            public_id: args.required_str("public_id")?,
            file: args.required_str("file")?,
            overwrite: args.optional_bool("overwrite")?,
            tags: args.optional_list("tags")?.unwrap_or_default(),
        };
        info!(public_id = %params.public_id, "upload");
        self.api.upload(&params).await.map_err(remote_failure)
    }
}

fn remote_failure(err: media_adapter::AdapterError) -> GateError {
    warn!("remote call failed: {err}");
    err.into()
}

fn search_query(args: &RequestArgs) -> Result<SearchQuery> {
    let mut query = SearchQuery::new(args.optional_str("expression")?.unwrap_or_default());
    if let Some(n) = args.optional_u32("max_results")? {
        query = query.max_results(n);
    }
    if let Some(cursor) = args.optional_str("next_cursor")? {
        query = query.next_cursor(cursor);
    }
    if let Some(fields) = args.optional_list("with_field")? {
        for field in fields {
            query = query.with_field(field);
        }
    }
    if let Some(sort) = args.get("sort_by") {
        for (field, direction) in sort_fields(sort)? {
            query = query.sort_by(field, direction);
        }
    }
    Ok(query)
}

/// `sort_by` accepts `"field"`, `"field:asc"`, `{"field": "asc"}`, or an
/// array of those. Direction defaults to descending.
fn sort_fields(value: &Value) -> Result<Vec<(String, SortDirection)>> {
    let invalid = |detail: &str| GateError::BadRequest(format!("invalid sort_by: {detail}"));
    let direction = |s: &str| SortDirection::parse(s).ok_or_else(|| invalid(s));

    match value {
        Value::String(s) => {
            let (field, dir) = match s.split_once(':') {
                Some((field, dir)) => (field.trim(), direction(dir)?),
                None => (s.trim(), SortDirection::default()),
            };
            if field.is_empty() {
                return Err(invalid("empty field name"));
            }
            Ok(vec![(field.to_string(), dir)])
        }
        Value::Object(map) => map
            .iter()
            .map(|(field, dir)| {
                let dir = dir.as_str().ok_or_else(|| invalid(field.as_str()))?;
                Ok((field.clone(), direction(dir)?))
            })
            .collect(),
        Value::Array(items) => {
            let mut out = vec![];
            for item in items {
                if item.is_array() {
                    return Err(invalid("nested array"));
                }
                out.extend(sort_fields(item)?);
            }
            Ok(out)
        }
        _ => Err(invalid("expected string, object or array")),
    }
}
