use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// A Search API query. An empty expression matches every asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<SortField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub with_field: Vec<String>,
}

impl SearchQuery {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Default::default()
        }
    }

    pub fn max_results(mut self, n: u32) -> Self {
        self.max_results = Some(n);
        self
    }

    pub fn next_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by.push(SortField {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.with_field.push(field.into());
        self
    }

    /// JSON body in the shape the Search API expects
    /// (`sort_by` is a list of single-key objects).
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("expression".into(), Value::String(self.expression.clone()));
        if let Some(n) = self.max_results {
            body.insert("max_results".into(), json!(n));
        }
        if let Some(cursor) = &self.next_cursor {
            body.insert("next_cursor".into(), Value::String(cursor.clone()));
        }
        if !self.sort_by.is_empty() {
            let sort: Vec<Value> = self
                .sort_by
                .iter()
                .map(|s| {
                    let mut entry = Map::new();
                    entry.insert(s.field.clone(), Value::String(s.direction.as_str().into()));
                    Value::Object(entry)
                })
                .collect();
            body.insert("sort_by".into(), Value::Array(sort));
        }
        if !self.with_field.is_empty() {
            body.insert("with_field".into(), json!(self.with_field));
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Some(Self::Asc),
            "desc" | "descending" | "-1" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// One page of Search API results. Unknown fields survive a round trip so
/// callers asking for the raw result see everything the remote sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResult {
    pub fn secure_urls(&self) -> Vec<String> {
        self.resources
            .iter()
            .filter_map(|r| r.secure_url.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub public_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub overwrite: bool,
    pub invalidate: bool,
}

/// Destroy answers 200 even when nothing was deleted; `result` carries the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyResult {
    pub result: String,
}

impl DestroyResult {
    pub const NOT_FOUND: &'static str = "not found";

    pub fn is_not_found(&self) -> bool {
        self.result == Self::NOT_FOUND
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagCommand {
    Add,
    Remove,
    Replace,
    RemoveAll,
}

impl TagCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::RemoveAll => "remove_all",
        }
    }

    pub fn takes_tag(self) -> bool {
        !matches!(self, Self::RemoveAll)
    }
}

impl fmt::Display for TagCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers the remote reports as affected by a tag command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResult {
    #[serde(default)]
    pub public_ids: Vec<String>,
}

/// Upload by reference: `file` is a remote URL or a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadParams {
    pub public_id: String,
    pub file: String,
    #[serde(default)]
    pub overwrite: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
