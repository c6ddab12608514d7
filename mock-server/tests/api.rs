use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

const REGISTER: &str =
    "email=me%40example.com&full_name=Me&password=secret&timezone=Europe%2FLondon";

// --- account ---

#[tokio::test]
async fn timezones_need_no_token() {
    let resp = app()
        .oneshot(get_request("/API/getTimezones"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let zones = body_json(resp).await;
    assert_eq!(zones[0][0], "UTC");
}

#[tokio::test]
async fn login_unknown_user_returns_marker() {
    let resp = app()
        .oneshot(form_request(
            "/API/login",
            "email=nobody%40example.com&password=x",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"\"LOGIN_ERROR\"");
}

#[tokio::test]
async fn register_returns_token() {
    let resp = app()
        .oneshot(form_request("/API/register", REGISTER))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["email"], "me@example.com");
    assert_eq!(user["timezone"], "Europe/London");
    assert!(user["api_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_short_password() {
    let resp = app()
        .oneshot(form_request(
            "/API/register",
            "email=a%40b.c&full_name=A&password=abc&timezone=UTC",
        ))
        .await
        .unwrap();

    assert_eq!(&body_bytes(resp).await[..], b"\"TOO_SHORT_PASSWORD\"");
}

// --- token checks ---

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let resp = app()
        .oneshot(get_request("/API/getProjects?token=nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bulk_endpoints_reject_malformed_lists() {
    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("/API/register", REGISTER))
        .await
        .unwrap();
    let token = body_json(resp).await["api_token"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/API/deleteItems?ids=1,2&token={token}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full session lifecycle ---

#[tokio::test]
async fn session_lifecycle() {
    let mut app = app().into_service();

    // register
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("/API/register", REGISTER))
        .await
        .unwrap();
    let token = body_json(resp).await["api_token"]
        .as_str()
        .unwrap()
        .to_string();

    // registration creates the inbox
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/API/getProjects?token={token}")))
        .await
        .unwrap();
    let projects = body_json(resp).await;
    assert_eq!(projects.as_array().unwrap().len(), 1);
    assert_eq!(projects[0]["name"], "Inbox");
    let inbox = projects[0]["id"].as_u64().unwrap();

    // add two items, the project reference uses the service's spelling
    let mut ids = Vec::new();
    for content in ["Buy milk @errands", "Call mom"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(form_request(
                "/API/addItem",
                &format!(
                    "proejct_id={inbox}&content={}&token={token}&priority=4",
                    content.replace(' ', "%20").replace('@', "%40")
                ),
            ))
            .await
            .unwrap();
        let item = body_json(resp).await;
        assert_eq!(item["project_id"], inbox);
        ids.push(item["id"].as_u64().unwrap());
    }

    // labels come from item content
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/API/getLabels?token={token}")))
        .await
        .unwrap();
    let labels = body_json(resp).await;
    assert_eq!(labels["errands"]["name"], "errands");

    // reorder
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!(
            "/API/updateOrders?project_id={inbox}&item_id_list=[{},{}]&token={token}",
            ids[1], ids[0]
        )))
        .await
        .unwrap();
    assert_eq!(&body_bytes(resp).await[..], b"\"ok\"");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!(
            "/API/getUncompletedItems?project_id={inbox}&token={token}"
        )))
        .await
        .unwrap();
    let items = body_json(resp).await;
    assert_eq!(items[0]["content"], "Call mom");
    assert_eq!(items[1]["content"], "Buy milk @errands");

    // query by priority
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request(
            "/API/query",
            &format!("queries=[p1,milk]&token={token}&as_count=1"),
        ))
        .await
        .unwrap();
    let results = body_json(resp).await;
    assert_eq!(results[0]["type"], "priority");
    assert_eq!(results[0]["data"], 2);
    assert_eq!(results[1]["data"], 1);

    // complete one
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!(
            "/API/completeItems?ids=[{}]&token={token}",
            ids[0]
        )))
        .await
        .unwrap();
    assert_eq!(&body_bytes(resp).await[..], b"\"ok\"");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!(
            "/API/getCompletedItems?project_id={inbox}&token={token}"
        )))
        .await
        .unwrap();
    let done = body_json(resp).await;
    assert_eq!(done.as_array().unwrap().len(), 1);
    assert_eq!(done[0]["id"], ids[0]);

    // delete the project and its items
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request(
            "/API/deleteProject",
            &format!("project_id={inbox}&token={token}"),
        ))
        .await
        .unwrap();
    assert_eq!(&body_bytes(resp).await[..], b"\"ok\"");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!(
            "/API/getItemsById?ids=[{},{}]&token={token}",
            ids[0], ids[1]
        )))
        .await
        .unwrap();
    let items = body_json(resp).await;
    assert!(items.as_array().unwrap().is_empty());
}
