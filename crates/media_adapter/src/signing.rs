//! Upload API request signing.
//!
//! Signed string: every parameter except the excluded ones, sorted by name,
//! `key=value` joined with `&` (lists comma-joined), followed by the API
//! secret. The signature is the hex SHA-1 or SHA-256 digest of that string,
//! whichever the account is set to.

use media_config::SignatureAlgorithm;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Sent with the request but never part of the signed string.
const UNSIGNED: &[&str] = &["api_key", "cloud_name", "file", "resource_type", "type"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct SignedParams {
    entries: BTreeMap<String, ParamValue>,
}

impl SignedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), ParamValue::One(value.into()));
        self
    }

    pub fn set_list(mut self, key: &str, values: &[String]) -> Self {
        self.entries.insert(key.to_string(), ParamValue::Many(values.to_vec()));
        self
    }

    pub fn set_flag(self, key: &str, value: bool) -> Self {
        self.set(key, if value { "true" } else { "false" })
    }

    pub fn string_to_sign(&self) -> String {
        self.entries
            .iter()
            .filter(|(k, _)| !UNSIGNED.contains(&k.as_str()))
            .filter_map(|(k, v)| {
                let joined = match v {
                    ParamValue::One(s) => s.clone(),
                    ParamValue::Many(list) => list.join(","),
                };
                (!joined.is_empty()).then(|| format!("{k}={joined}"))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn signature(&self, api_secret: &str, algorithm: SignatureAlgorithm) -> String {
        match algorithm {
            SignatureAlgorithm::Sha1 => digest::<Sha1>(&self.string_to_sign(), api_secret),
            SignatureAlgorithm::Sha256 => digest::<Sha256>(&self.string_to_sign(), api_secret),
        }
    }

    /// Form fields for the POST body: lists expand to repeated `key[]`,
    /// then `api_key` and `signature` are appended.
    pub fn into_form(
        self,
        api_key: &str,
        api_secret: &str,
        algorithm: SignatureAlgorithm,
    ) -> Vec<(String, String)> {
        let signature = self.signature(api_secret, algorithm);
        let mut form = Vec::with_capacity(self.entries.len() + 2);
        for (k, v) in self.entries {
            match v {
                ParamValue::One(s) => form.push((k, s)),
                ParamValue::Many(list) => {
                    let key = format!("{k}[]");
                    form.extend(list.into_iter().map(|s| (key.clone(), s)));
                }
            }
        }
        form.push(("api_key".into(), api_key.into()));
        form.push(("signature".into(), signature));
        form
    }
}

fn digest<D: Digest>(to_sign: &str, api_secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
