//! Delivery URLs with an encoded transformation.
//!
//! A descriptor is one of:
//! - a string, used verbatim (`"w_300,c_scale"`)
//! - an object of named parameters (`{"width": 300, "crop": "scale"}`)
//! - an array of the above, chained with `/`
//!
//! `{res_base}/{cloud}/image/upload/{transformation}/{public_id}`

use crate::error::{AdapterError, Result};
use serde_json::Value;

/// Named parameter → URL short code, sorted by name.
const PARAMS: &[(&str, &str)] = &[
    ("angle", "a"),
    ("aspect_ratio", "ar"),
    ("audio_codec", "ac"),
    ("background", "b"),
    ("bit_rate", "br"),
    ("border", "bo"),
    ("color", "co"),
    ("crop", "c"),
    ("default_image", "d"),
    ("delay", "dl"),
    ("density", "dn"),
    ("dpr", "dpr"),
    ("duration", "du"),
    ("effect", "e"),
    ("end_offset", "eo"),
    ("fetch_format", "f"),
    ("flags", "fl"),
    ("gravity", "g"),
    ("height", "h"),
    ("opacity", "o"),
    ("overlay", "l"),
    ("page", "pg"),
    ("quality", "q"),
    ("radius", "r"),
    ("start_offset", "so"),
    ("transformation", "t"),
    ("underlay", "u"),
    ("video_codec", "vc"),
    ("width", "w"),
    ("x", "x"),
    ("y", "y"),
    ("zoom", "z"),
];

fn short_code(name: &str) -> Option<&'static str> {
    PARAMS
        .binary_search_by(|(k, _)| k.cmp(&name))
        .ok()
        .map(|i| PARAMS[i].1)
}

/// An encoded transformation chain. Each element is one `/`-separated segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transformation {
    segments: Vec<String>,
}

impl Transformation {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_value(descriptor: &Value) -> Result<Self> {
        let mut segments = vec![];
        match descriptor {
            Value::Array(items) => {
                for item in items {
                    if item.is_array() {
                        return Err(AdapterError::InvalidTransformation(
                            "nested arrays are not allowed".into(),
                        ));
                    }
                    segments.extend(Self::from_value(item)?.segments);
                }
            }
            Value::String(raw) => {
                let raw = raw.trim().trim_matches('/');
                if !raw.is_empty() {
                    segments.push(raw.to_string());
                }
            }
            Value::Object(map) => {
                let segment = encode_object(map)?;
                if !segment.is_empty() {
                    segments.push(segment);
                }
            }
            Value::Null => {}
            other => {
                return Err(AdapterError::InvalidTransformation(format!(
                    "expected string, object or array, got {other}"
                )))
            }
        }
        Ok(Self { segments })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn to_path(&self) -> String {
        self.segments.join("/")
    }
}

fn encode_object(map: &serde_json::Map<String, Value>) -> Result<String> {
    let mut components: Vec<(&'static str, String)> = vec![];
    let mut raw_tail: Option<String> = None;

    for (name, value) in map {
        if name == "raw_transformation" {
            raw_tail = Some(scalar(name, value)?);
            continue;
        }
        let code = short_code(name).ok_or_else(|| {
            AdapterError::InvalidTransformation(format!("unknown parameter {name:?}"))
        })?;
        let encoded = if name == "flags" {
            match value {
                Value::Array(flags) => flags
                    .iter()
                    .map(|f| scalar(name, f))
                    .collect::<Result<Vec<_>>>()?
                    .join("."),
                other => scalar(name, other)?,
            }
        } else {
            scalar(name, value)?
        };
        if !encoded.is_empty() {
            components.push((code, encoded));
        }
    }

    components.sort_by(|a, b| a.0.cmp(b.0));
    let mut parts: Vec<String> = components
        .into_iter()
        .map(|(code, v)| format!("{code}_{v}"))
        .collect();
    if let Some(raw) = raw_tail.filter(|r| !r.is_empty()) {
        parts.push(raw);
    }
    Ok(parts.join(","))
}

fn scalar(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(AdapterError::InvalidTransformation(format!(
            "parameter {name:?} must be a scalar"
        ))),
    }
}

/// Build the delivery URL of an image asset. Folder separators in the
/// public id are kept; every other reserved character is percent-encoded.
pub fn delivery_url(
    res_base: &str,
    cloud_name: &str,
    public_id: &str,
    transformation: &Transformation,
) -> String {
    let id: Vec<String> = public_id
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect();
    let base = res_base.trim_end_matches('/');
    if transformation.is_empty() {
        format!("{base}/{cloud_name}/image/upload/{}", id.join("/"))
    } else {
        format!(
            "{base}/{cloud_name}/image/upload/{}/{}",
            transformation.to_path(),
            id.join("/")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RES: &str = "https://res.cloudinary.com";

    fn encode(v: Value) -> String {
        Transformation::from_value(&v).unwrap().to_path()
    }

    #[test]
    fn params_table_is_sorted() {
        assert!(PARAMS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn object_components_sorted_by_code() {
        assert_eq!(
            encode(json!({"width": 300, "height": 200, "crop": "fill"})),
            "c_fill,h_200,w_300"
        );
    }

    #[test]
    fn array_chains_segments() {
        assert_eq!(
            encode(json!([{"width": 300, "crop": "scale"}, {"angle": 90}, "e_sepia"])),
            "c_scale,w_300/a_90/e_sepia"
        );
    }

    #[test]
    fn flags_join_with_dots() {
        assert_eq!(
            encode(json!({"flags": ["progressive", "lossy"], "quality": "auto"})),
            "fl_progressive.lossy,q_auto"
        );
    }

    #[test]
    fn raw_transformation_is_appended() {
        assert_eq!(
            encode(json!({"width": 100, "raw_transformation": "e_grayscale"})),
            "w_100,e_grayscale"
        );
    }

    #[test]
    fn fractional_numbers_keep_precision() {
        assert_eq!(encode(json!({"opacity": 50, "dpr": 2.5})), "dpr_2.5,o_50");
    }

    #[test]
    fn unknown_parameter_rejected() {
        let err = Transformation::from_value(&json!({"wdth": 300})).unwrap_err();
        assert!(err.to_string().contains("wdth"));
    }

    #[test]
    fn non_scalar_value_rejected() {
        assert!(Transformation::from_value(&json!({"width": {"px": 3}})).is_err());
        assert!(Transformation::from_value(&json!(42)).is_err());
        assert!(Transformation::from_value(&json!([[{"width": 1}]])).is_err());
    }

    #[test]
    fn url_with_transformation() {
        let t = Transformation::from_value(&json!({"width": 300, "crop": "scale"})).unwrap();
        assert_eq!(
            delivery_url(RES, "demo", "sample", &t),
            "https://res.cloudinary.com/demo/image/upload/c_scale,w_300/sample"
        );
    }

    #[test]
    fn url_without_transformation() {
        assert_eq!(
            delivery_url(RES, "demo", "folder/sample", &Transformation::none()),
            "https://res.cloudinary.com/demo/image/upload/folder/sample"
        );
    }

    #[test]
    fn url_encodes_reserved_characters() {
        assert_eq!(
            delivery_url(RES, "demo", "my photos/cat #1", &Transformation::none()),
            "https://res.cloudinary.com/demo/image/upload/my%20photos/cat%20%231"
        );
    }
}
