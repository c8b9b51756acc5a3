use media_adapter::fake::{Call, FakeMediaApi, Op, Reply};
use media_adapter::{SearchQuery, TagCommand};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;

async fn setup(fake: Arc<FakeMediaApi>) -> (String, Client, tokio::task::JoinHandle<()>) {
    let (addr, handle) = media_gate::test::spawn(fake).await;
    (format!("http://{addr}"), Client::new(), handle)
}

fn search_page() -> Value {
    json!({
        "total_count": 1,
        "time": 269,
        "resources": [{
            "public_id": "sample",
            "format": "jpg",
            "url": "http://res.cloudinary.com/demo/image/upload/v1559724354/sample.jpg",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1559724354/sample.jpg"
        }]
    })
}

#[tokio::test]
async fn asset_lifecycle_end_to_end() {
    let fake = Arc::new(FakeMediaApi::new().with_reply(Op::Search, Reply::Json(search_page())));
    let (base, http, _h) = setup(fake.clone()).await;

    // 0) healthz
    let health: Value = http
        .get(format!("{base}/healthz"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["ok"], true);
    assert_eq!(health["configured"], true);

    // 1) upload
    let uploaded: Value = http
        .post(format!("{base}/assets"))
        .json(&json!({"public_id": "sample", "file": "https://example.com/sample.jpg"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(uploaded["public_id"], "sample");

    // 2) search → secure urls
    let urls: Value = http
        .get(format!("{base}/search/sample"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        urls,
        json!(["https://res.cloudinary.com/demo/image/upload/v1559724354/sample.jpg"])
    );

    // 3) transform
    let url: Value = http
        .post(format!("{base}/assets/transform"))
        .json(&json!({"public_id": "sample", "transformation": {"width": 300, "crop": "scale"}}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        url,
        "https://res.cloudinary.com/demo/image/upload/c_scale,w_300/sample"
    );

    // 4) tag
    let tagged = http
        .post(format!("{base}/tags/pets"))
        .json(&json!({"public_ids": ["sample"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(tagged.status(), 200);
    let tagged: Value = tagged.json().await.unwrap();
    assert_eq!(tagged["public_ids"], json!(["sample"]));

    // 5) rename via path
    let renamed = http
        .put(format!("{base}/assets/sample"))
        .json(&json!({"to_public_id": "renamed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(renamed.status(), 200);

    // 6) destroy via path
    let destroyed: Value = http
        .delete(format!("{base}/assets/renamed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(destroyed["result"], "ok");

    let calls = fake.calls();
    assert_eq!(fake.remote_calls(), 5);
    assert!(calls.contains(&Call::Search(SearchQuery::new("sample"))));
    assert!(calls.contains(&Call::Tags {
        command: TagCommand::Add,
        tag: Some("pets".into()),
        public_ids: vec!["sample".into()],
    }));
    assert!(calls.iter().any(|c| matches!(
        c,
        Call::Rename { from, to, .. } if from == "sample" && to == "renamed"
    )));
}

#[tokio::test]
async fn search_without_expression_sends_empty_expression() {
    let fake = Arc::new(FakeMediaApi::new());
    let (base, http, _h) = setup(fake.clone()).await;
    for path in ["/search", "/search/"] {
        let resp = http.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), 200, "{path}");
    }
    assert_eq!(
        fake.calls(),
        vec![
            Call::Search(SearchQuery::new("")),
            Call::Search(SearchQuery::new(""))
        ]
    );
}

#[tokio::test]
async fn post_search_with_raw_returns_result_object() {
    let fake = Arc::new(FakeMediaApi::new().with_reply(Op::Search, Reply::Json(search_page())));
    let (base, http, _h) = setup(fake).await;
    let raw: Value = http
        .post(format!("{base}/assets/search"))
        .json(&json!({"expression": "format:jpg", "raw": true, "max_results": 5}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(raw["total_count"], 1);
    assert_eq!(raw["time"], 269);
    assert_eq!(raw["resources"][0]["public_id"], "sample");
}

#[tokio::test]
async fn legacy_tag_routes_read_tag_from_body() {
    let fake = Arc::new(FakeMediaApi::new());
    let (base, http, _h) = setup(fake.clone()).await;

    let add = http
        .post(format!("{base}/add_tag"))
        .json(&json!({"tag": "a", "public_ids": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(add.status(), 200);
    let replace = http
        .put(format!("{base}/replace_tag"))
        .json(&json!({"tag": "b", "public_ids": ["x"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(replace.status(), 200);
    let remove = http
        .delete(format!("{base}/remove_tag"))
        .json(&json!({"tag": "b", "public_ids": ["x"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(remove.status(), 200);
    let remove_all = http
        .delete(format!("{base}/tags/remove_all"))
        .json(&json!({"public_ids": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(remove_all.status(), 200);

    let commands: Vec<TagCommand> = fake
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Tags { command, .. } => Some(command),
            _ => None,
        })
        .collect();
    assert_eq!(
        commands,
        vec![
            TagCommand::Add,
            TagCommand::Replace,
            TagCommand::Remove,
            TagCommand::RemoveAll
        ]
    );
}

#[tokio::test]
async fn rename_and_destroy_legacy_routes() {
    let fake = Arc::new(FakeMediaApi::new());
    let (base, http, _h) = setup(fake.clone()).await;

    let renamed: Value = http
        .patch(format!("{base}/rename"))
        .json(&json!({"from_public_id": "a", "to_public_id": "b"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["public_id"], "b");

    let destroyed = http
        .delete(format!("{base}/destroy?public_id=b"))
        .send()
        .await
        .unwrap();
    assert_eq!(destroyed.status(), 200);
    assert!(fake.calls().contains(&Call::Destroy {
        public_id: "b".into(),
        invalidate: false
    }));
}

#[tokio::test]
async fn open_api_is_raw_json() {
    let (base, http, _h) = setup(Arc::new(FakeMediaApi::new())).await;
    let resp = http.get(format!("{base}/openApi")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let doc: Value = resp.json().await.unwrap();
    assert!(doc["paths"]["/assets/transform"]["post"].is_object());
}

#[tokio::test]
async fn repeated_query_ids_all_reach_the_remote() {
    let fake = Arc::new(FakeMediaApi::new());
    let (base, http, _h) = setup(fake.clone()).await;

    let resp = http
        .delete(format!("{base}/tags/remove_all?public_ids=a&public_ids=b"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["public_ids"], json!(["a", "b"]));

    let resp = http
        .delete(format!("{base}/tags/pets?public_ids[]=c&public_ids[]=d"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(
        fake.calls(),
        vec![
            Call::Tags {
                command: TagCommand::RemoveAll,
                tag: None,
                public_ids: vec!["a".into(), "b".into()],
            },
            Call::Tags {
                command: TagCommand::Remove,
                tag: Some("pets".into()),
                public_ids: vec!["c".into(), "d".into()],
            },
        ]
    );
}

#[tokio::test]
async fn remove_all_segment_is_a_tag_name_for_post_and_put() {
    let fake = Arc::new(FakeMediaApi::new());
    let (base, http, _h) = setup(fake.clone()).await;

    let add = http
        .post(format!("{base}/tags/remove_all"))
        .json(&json!({"public_ids": ["a"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(add.status(), 200);
    let replace = http
        .put(format!("{base}/tags/remove_all"))
        .json(&json!({"public_ids": ["a"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(replace.status(), 200);

    assert_eq!(
        fake.calls(),
        vec![
            Call::Tags {
                command: TagCommand::Add,
                tag: Some("remove_all".into()),
                public_ids: vec!["a".into()],
            },
            Call::Tags {
                command: TagCommand::Replace,
                tag: Some("remove_all".into()),
                public_ids: vec!["a".into()],
            },
        ]
    );
}
