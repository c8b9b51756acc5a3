use crate::TagAction;
use colored::Colorize;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct Client {
    base: String,
    http: reqwest::blocking::Client,
}

/// Error body returned by the gate for every 4xx/5xx and 206 answer.
#[derive(Debug, Deserialize)]
struct GateError {
    message: String,
    #[serde(default)]
    errors: Vec<Failure>,
}

#[derive(Debug, Deserialize)]
struct Failure {
    reason: String,
    public_id: String,
}

impl Client {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn get(&self, path: &str) -> Result<Value, String> {
        let url = format!("{}{}", self.base, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| format!("request failed: {e}"))?;
        read(resp)
    }

    fn send(&self, method: Method, path: &str, body: &Value) -> Result<Value, String> {
        let url = format!("{}{}", self.base, path);
        let resp = self
            .http
            .request(method, &url)
            .json(body)
            .send()
            .map_err(|e| format!("request failed: {e}"))?;
        read(resp)
    }
}

/// A 206 is a partial failure, not a success.
fn read(resp: reqwest::blocking::Response) -> Result<Value, String> {
    let status = resp.status();
    let code = status.as_u16();
    if status.is_success() && code != 206 {
        return resp.json().map_err(|e| format!("parse response: {e}"));
    }
    let text = resp.text().unwrap_or_default();
    let Ok(err) = serde_json::from_str::<GateError>(&text) else {
        return Err(format!("HTTP {code}: {}", text.trim()));
    };
    for failure in &err.errors {
        eprintln!("  {} {} ({})", "✗".red(), failure.public_id, failure.reason.dimmed());
    }
    Err(format!("HTTP {code}: {}", err.message))
}

// ── search ──────────────────────────────────────────────────────

pub fn search(
    client: &Client,
    expression: &str,
    max_results: Option<u32>,
    sort_by: &[String],
    next_cursor: Option<&str>,
    raw: bool,
) -> Result<(), String> {
    let mut body = json!({ "expression": expression, "raw": raw });
    if let Some(n) = max_results {
        body["max_results"] = json!(n);
    }
    if !sort_by.is_empty() {
        body["sort_by"] = json!(sort_by);
    }
    if let Some(cursor) = next_cursor {
        body["next_cursor"] = json!(cursor);
    }

    let json = client.send(Method::POST, "/assets/search", &body)?;
    if raw {
        print_pretty(&json);
        return Ok(());
    }

    let urls = json.as_array().ok_or("parse response: expected an array")?;
    if urls.is_empty() {
        println!("{}", "No matching assets.".dimmed());
    }
    for url in urls.iter().filter_map(Value::as_str) {
        println!("{url}");
    }
    Ok(())
}

// ── transform ───────────────────────────────────────────────────

pub fn transform(client: &Client, public_id: &str, transformation: &str) -> Result<(), String> {
    // Anything that parses as JSON is sent structured, the rest as a raw string.
    let transformation = serde_json::from_str::<Value>(transformation)
        .ok()
        .filter(|v| v.is_object() || v.is_array())
        .unwrap_or_else(|| json!(transformation));
    let body = json!({ "public_id": public_id, "transformation": transformation });

    let json = client.send(Method::POST, "/assets/transform", &body)?;
    let url = json.as_str().ok_or("parse response: expected a URL")?;
    println!("{}", url.cyan());
    Ok(())
}

// ── rename ──────────────────────────────────────────────────────

pub fn rename(
    client: &Client,
    from: &str,
    to: &str,
    overwrite: bool,
    invalidate: bool,
) -> Result<(), String> {
    let body = json!({
        "from_public_id": from,
        "to_public_id": to,
        "overwrite": overwrite,
        "invalidate": invalidate,
    });
    client.send(Method::PATCH, "/rename", &body)?;
    println!("{} {} → {}", "✓".green().bold(), from.dimmed(), to.cyan());
    Ok(())
}

// ── destroy ─────────────────────────────────────────────────────

pub fn destroy(client: &Client, public_id: &str, invalidate: bool) -> Result<(), String> {
    let body = json!({ "public_id": public_id, "invalidate": invalidate });
    let json = client.send(Method::DELETE, "/destroy", &body)?;
    let result = json.get("result").and_then(|r| r.as_str()).unwrap_or("?");
    println!("{} {} {}", "✓".green().bold(), public_id.cyan(), result.dimmed());
    Ok(())
}

// ── upload ──────────────────────────────────────────────────────

pub fn upload(
    client: &Client,
    public_id: &str,
    file: &str,
    tags: &[String],
    overwrite: bool,
) -> Result<(), String> {
    let mut body = json!({ "public_id": public_id, "file": file, "overwrite": overwrite });
    if !tags.is_empty() {
        body["tags"] = json!(tags);
    }
    let json = client.send(Method::POST, "/assets", &body)?;
    let url = json
        .get("secure_url")
        .and_then(|u| u.as_str())
        .unwrap_or(public_id);
    println!("{} {}", "✓".green().bold(), url.cyan());
    Ok(())
}

// ── tag ─────────────────────────────────────────────────────────

pub fn tag(client: &Client, action: TagAction) -> Result<(), String> {
    let (method, path, body) = match action {
        TagAction::Add { tag, public_ids } => (
            Method::POST,
            "/add_tag",
            json!({ "tag": tag, "public_ids": public_ids }),
        ),
        TagAction::Remove { tag, public_ids } => (
            Method::DELETE,
            "/remove_tag",
            json!({ "tag": tag, "public_ids": public_ids }),
        ),
        TagAction::Replace { tag, public_ids } => (
            Method::PUT,
            "/replace_tag",
            json!({ "tag": tag, "public_ids": public_ids }),
        ),
        TagAction::RemoveAll { public_ids } => (
            Method::DELETE,
            "/remove_all_tags",
            json!({ "public_ids": public_ids }),
        ),
    };

    let json = client.send(method, path, &body)?;
    let affected = json
        .get("public_ids")
        .and_then(|p| p.as_array())
        .cloned()
        .unwrap_or_default();
    println!("{} {} assets", "✓".green().bold(), affected.len());
    for id in affected.iter().filter_map(Value::as_str) {
        println!("  {} {}", "•".dimmed(), id);
    }
    Ok(())
}

// ── health ──────────────────────────────────────────────────────

pub fn health(client: &Client) -> Result<(), String> {
    let json = match client.get("/healthz") {
        Ok(json) => json,
        Err(e) => {
            println!("{} gate unreachable", "●".red());
            return Err(e);
        }
    };
    let configured = json.get("configured").and_then(|c| c.as_bool()).unwrap_or(false);
    if configured {
        println!("{} {}", "●".green(), "ok".green().bold());
    } else {
        println!("{} {} (no credentials)", "●".yellow(), "inert".yellow().bold());
    }
    Ok(())
}

// ── openapi ─────────────────────────────────────────────────────

pub fn openapi(client: &Client) -> Result<(), String> {
    let json = client.get("/openApi")?;
    print_pretty(&json);
    Ok(())
}

// ── helpers ─────────────────────────────────────────────────────

fn print_pretty(json: &Value) {
    println!("{}", serde_json::to_string_pretty(json).unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[test]
    fn unreachable_gate_fails_health() {
        let client = Client::new(&closed_port_url());
        let err = health(&client).unwrap_err();
        assert!(err.starts_with("request failed"), "{err}");
        assert_eq!(crate::exit_code_for(&err), crate::EXIT_OTHER);
    }
}
