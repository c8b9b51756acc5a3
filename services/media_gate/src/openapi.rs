//! Static OpenAPI description served at `GET /openApi`.

pub const OPENAPI_JSON: &str = include_str!("../openapi.json");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn document_is_valid_json() {
        let doc: Value = serde_json::from_str(OPENAPI_JSON).unwrap();
        assert_eq!(doc["openapi"], "3.0.3");
    }

    #[test]
    fn every_route_is_described() {
        let doc: Value = serde_json::from_str(OPENAPI_JSON).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for (path, verb) in [
            ("/search", "get"),
            ("/search/{expression}", "get"),
            ("/assets/search", "post"),
            ("/assets/transform", "post"),
            ("/assets", "post"),
            ("/assets/{id}", "put"),
            ("/assets/{id}", "delete"),
            ("/rename", "patch"),
            ("/destroy", "delete"),
            ("/tags/{tag}", "post"),
            ("/tags/{tag}", "put"),
            ("/tags/{tag}", "delete"),
            ("/tags/remove_all", "post"),
            ("/tags/remove_all", "put"),
            ("/tags/remove_all", "delete"),
            ("/add_tag", "post"),
            ("/replace_tag", "put"),
            ("/remove_tag", "delete"),
            ("/remove_all_tags", "delete"),
            ("/openApi", "get"),
            ("/healthz", "get"),
        ] {
            assert!(paths[path].get(verb).is_some(), "{verb} {path} missing");
        }
    }
}
