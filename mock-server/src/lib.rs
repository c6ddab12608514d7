//! In-memory stand-in for the Todoist `/API/<name>` endpoints.
//!
//! Reads and bulk id-list operations are served on GET with a query string,
//! everything else on POST with a form body, matching what the client sends.
//! Failures follow the service's conventions: a JSON string marker such as
//! `"LOGIN_ERROR"` with status 200, or 401 for an unknown token.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub type Params = HashMap<String, String>;

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub full_name: String,
    pub timezone: String,
    pub api_token: String,
    #[serde(skip)]
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub color: i64,
    pub indent: i64,
    pub item_order: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
    pub color: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Item {
    pub id: u64,
    pub project_id: u64,
    pub content: String,
    pub date_string: Option<String>,
    pub due_date: Option<String>,
    pub priority: i64,
    pub indent: i64,
    pub item_order: i64,
    pub checked: i64,
}

#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<String, User>,
    sessions: HashMap<String, String>,
    projects: BTreeMap<u64, Project>,
    labels: BTreeMap<String, Label>,
    items: BTreeMap<u64, Item>,
    last_id: u64,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn session_user(&self, params: &Params) -> Option<&User> {
        let email = self.sessions.get(params.get("token")?)?;
        self.users.get(email)
    }

    fn create_project(&mut self, name: &str) -> Project {
        let project = Project {
            id: self.next_id(),
            name: name.to_string(),
            color: 0,
            indent: 1,
            item_order: self.projects.len() as i64 + 1,
        };
        self.projects.insert(project.id, project.clone());
        project
    }

    /// Register every `@name` word of `content` as a label.
    fn collect_labels(&mut self, content: &str) {
        for word in content.split_whitespace() {
            if let Some(name) = word.strip_prefix('@').filter(|n| !n.is_empty()) {
                if !self.labels.contains_key(name) {
                    let label = Label {
                        id: self.next_id(),
                        name: name.to_string(),
                        color: 0,
                    };
                    self.labels.insert(name.to_string(), label);
                }
            }
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub const TIMEZONES: &[(&str, &str)] = &[
    ("UTC", "(GMT+0000) UTC"),
    ("Europe/London", "(GMT+0000) Europe/London"),
    ("Europe/Copenhagen", "(GMT+0100) Europe/Copenhagen"),
    ("America/New_York", "(GMT-0500) America/New_York"),
    ("Asia/Tokyo", "(GMT+0900) Asia/Tokyo"),
];

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/API/login", post(login))
        .route("/API/getTimezones", get(get_timezones))
        .route("/API/register", post(register))
        .route("/API/updateUser", post(update_user))
        .route("/API/getProjects", get(get_projects))
        .route("/API/getProject", get(get_project))
        .route("/API/addProject", post(add_project))
        .route("/API/updateProject", post(update_project))
        .route("/API/deleteProject", post(delete_project))
        .route("/API/getLabels", get(get_labels))
        .route("/API/updateLabel", post(update_label))
        .route("/API/deleteLabel", post(delete_label))
        .route("/API/getUncompletedItems", get(get_uncompleted_items))
        .route("/API/getCompletedItems", get(get_completed_items))
        .route("/API/getItemsById", get(get_items_by_id))
        .route("/API/addItem", post(add_item))
        .route("/API/updateItem", post(update_item))
        .route("/API/updateOrders", get(update_orders))
        .route("/API/updateRecurringDate", get(update_recurring_date))
        .route("/API/deleteItems", get(delete_items))
        .route("/API/completeItems", get(complete_items))
        .route("/API/uncompleteItems", get(uncomplete_items))
        .route("/API/query", post(query))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn marker(text: &str) -> Response {
    Json(text).into_response()
}

fn unauthorized() -> Response {
    tracing::debug!("rejected unknown token");
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

fn bad_request(what: &str) -> Response {
    (StatusCode::BAD_REQUEST, format!("invalid {what}")).into_response()
}

fn text<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

fn number(params: &Params, name: &str) -> Option<i64> {
    params.get(name)?.parse().ok()
}

fn id(params: &Params, name: &str) -> Option<u64> {
    params.get(name)?.parse().ok()
}

/// Parse a bracketed literal such as `[1,2,3]`.
pub fn parse_id_list(raw: &str) -> Option<Vec<u64>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    inner.split(',').map(|s| s.trim().parse().ok()).collect()
}

/// Split a bracketed literal of query strings without unquoting anything.
pub fn parse_query_list(raw: &str) -> Option<Vec<String>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

// -- account ----------------------------------------------------------------

async fn login(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    let user = match (text(&params, "email"), text(&params, "password")) {
        (Some(email), Some(password)) => store
            .users
            .get(email)
            .filter(|u| u.password == password)
            .cloned(),
        _ => None,
    };
    match user {
        Some(user) => {
            store.sessions.insert(user.api_token.clone(), user.email.clone());
            Json(user).into_response()
        }
        None => marker("LOGIN_ERROR"),
    }
}

async fn get_timezones() -> Json<Vec<[&'static str; 2]>> {
    Json(TIMEZONES.iter().map(|(tz, label)| [*tz, *label]).collect())
}

async fn register(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let (Some(email), Some(full_name), Some(password), Some(timezone)) = (
        text(&params, "email"),
        text(&params, "full_name"),
        text(&params, "password"),
        text(&params, "timezone"),
    ) else {
        return marker("ERROR_MISSING_FIELD");
    };

    let mut store = db.write().await;
    if store.users.contains_key(email) {
        return marker("ALREADY_REGISTRED");
    }
    if password.len() < 5 {
        return marker("TOO_SHORT_PASSWORD");
    }

    let user = User {
        id: store.next_id(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        timezone: timezone.to_string(),
        api_token: Uuid::new_v4().simple().to_string(),
        password: password.to_string(),
    };
    store.users.insert(user.email.clone(), user.clone());
    store.sessions.insert(user.api_token.clone(), user.email.clone());
    store.create_project("Inbox");
    Json(user).into_response()
}

async fn update_user(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    let Some(mut user) = store.session_user(&params).cloned() else {
        return unauthorized();
    };

    if let Some(password) = text(&params, "password") {
        if password.len() < 5 {
            return marker("ERROR_PASSWORD_TOO_SHORT");
        }
        user.password = password.to_string();
    }
    if let Some(full_name) = text(&params, "full_name") {
        user.full_name = full_name.to_string();
    }
    if let Some(timezone) = text(&params, "timezone") {
        user.timezone = timezone.to_string();
    }
    if let Some(email) = text(&params, "email").filter(|e| *e != user.email) {
        if store.users.contains_key(email) {
            return marker("ERROR_EMAIL_FOUND");
        }
        store.users.remove(&user.email);
        user.email = email.to_string();
        store.sessions.insert(user.api_token.clone(), user.email.clone());
    }

    store.users.insert(user.email.clone(), user.clone());
    Json(user).into_response()
}

// -- projects ---------------------------------------------------------------

async fn get_projects(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    Json(store.projects.values().cloned().collect::<Vec<_>>()).into_response()
}

async fn get_project(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    let Some(project_id) = id(&params, "project_id") else {
        return bad_request("project_id");
    };
    match store.projects.get(&project_id) {
        Some(project) => Json(project.clone()).into_response(),
        None => marker("ERROR_PROJECT_NOT_FOUND"),
    }
}

async fn add_project(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(name) = text(&params, "name") else {
        return marker("ERROR_NAME_IS_EMPTY");
    };
    let mut project = store.create_project(name);
    if let Some(color) = number(&params, "color") {
        project.color = color;
    }
    if let Some(indent) = number(&params, "indent") {
        project.indent = indent;
    }
    if let Some(order) = number(&params, "order") {
        project.item_order = order;
    }
    store.projects.insert(project.id, project.clone());
    Json(project).into_response()
}

async fn update_project(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let project = id(&params, "proejct_id").and_then(|pid| store.projects.get_mut(&pid));
    let Some(project) = project else {
        return marker("ERROR_PROJECT_NOT_FOUND");
    };
    if let Some(name) = text(&params, "name") {
        project.name = name.to_string();
    }
    if let Some(color) = number(&params, "color") {
        project.color = color;
    }
    if let Some(indent) = number(&params, "indent") {
        project.indent = indent;
    }
    Json(project.clone()).into_response()
}

async fn delete_project(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(project_id) = id(&params, "project_id") else {
        return bad_request("project_id");
    };
    if store.projects.remove(&project_id).is_none() {
        return marker("ERROR_PROJECT_NOT_FOUND");
    }
    store.items.retain(|_, item| item.project_id != project_id);
    marker("ok")
}

// -- labels -----------------------------------------------------------------

async fn get_labels(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    Json(store.labels.clone()).into_response()
}

async fn update_label(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let (Some(old_name), Some(new_name)) = (text(&params, "old_name"), text(&params, "new_name"))
    else {
        return bad_request("label name");
    };
    let Some(mut label) = store.labels.remove(old_name) else {
        return marker("ERROR_LABEL_NOT_FOUND");
    };
    label.name = new_name.to_string();
    store.labels.insert(label.name.clone(), label);

    let (from, to) = (format!("@{old_name}"), format!("@{new_name}"));
    for item in store.items.values_mut() {
        item.content = item
            .content
            .split(' ')
            .map(|word| if word == from { to.as_str() } else { word })
            .collect::<Vec<_>>()
            .join(" ");
    }
    marker("ok")
}

async fn delete_label(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(name) = text(&params, "name") else {
        return bad_request("name");
    };
    if store.labels.remove(name).is_none() {
        return marker("ERROR_LABEL_NOT_FOUND");
    }
    marker("ok")
}

// -- items ------------------------------------------------------------------

fn project_items(store: &Store, project_id: u64, checked: i64) -> Vec<Item> {
    let mut items: Vec<Item> = store
        .items
        .values()
        .filter(|item| item.project_id == project_id && item.checked == checked)
        .cloned()
        .collect();
    items.sort_by_key(|item| item.item_order);
    items
}

async fn get_uncompleted_items(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(project_id) = id(&params, "project_id") else {
        return bad_request("project_id");
    };
    Json(project_items(&store, project_id, 0)).into_response()
}

async fn get_completed_items(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(project_id) = id(&params, "project_id") else {
        return bad_request("project_id");
    };
    Json(project_items(&store, project_id, 1)).into_response()
}

async fn get_items_by_id(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(ids) = params.get("ids").and_then(|raw| parse_id_list(raw)) else {
        return bad_request("ids");
    };
    let items: Vec<Item> = ids.iter().filter_map(|id| store.items.get(id).cloned()).collect();
    Json(items).into_response()
}

async fn add_item(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(project_id) = id(&params, "proejct_id").filter(|pid| store.projects.contains_key(pid))
    else {
        return marker("ERROR_PROJECT_NOT_FOUND");
    };
    let Some(content) = text(&params, "content") else {
        return marker("ERROR_CONTENT_IS_EMPTY");
    };

    let item_order = number(&params, "item_order")
        .unwrap_or_else(|| project_items(&store, project_id, 0).len() as i64 + 1);
    let date_string = text(&params, "date_string").map(str::to_string);
    let item = Item {
        id: store.next_id(),
        project_id,
        content: content.to_string(),
        due_date: date_string.clone(),
        date_string,
        priority: number(&params, "priority").unwrap_or(1),
        indent: number(&params, "indent").unwrap_or(1),
        item_order,
        checked: 0,
    };
    store.collect_labels(content);
    store.items.insert(item.id, item.clone());
    Json(item).into_response()
}

async fn update_item(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let target = id(&params, "proejct_id");
    if target.is_some_and(|pid| !store.projects.contains_key(&pid)) {
        return marker("ERROR_PROJECT_NOT_FOUND");
    }
    let Some(mut item) = id(&params, "id").and_then(|iid| store.items.get(&iid).cloned()) else {
        return marker("ERROR_ITEM_NOT_FOUND");
    };

    if let Some(project_id) = target {
        item.project_id = project_id;
    }
    if let Some(content) = text(&params, "content") {
        item.content = content.to_string();
        store.collect_labels(content);
    }
    if let Some(date_string) = text(&params, "date_string") {
        item.date_string = Some(date_string.to_string());
        item.due_date = Some(date_string.to_string());
    }
    if let Some(priority) = number(&params, "priority") {
        item.priority = priority;
    }
    if let Some(indent) = number(&params, "indent") {
        item.indent = indent;
    }
    if let Some(item_order) = number(&params, "item_order") {
        item.item_order = item_order;
    }
    store.items.insert(item.id, item.clone());
    Json(item).into_response()
}

async fn update_orders(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let (Some(project_id), Some(ids)) = (
        id(&params, "project_id"),
        params.get("item_id_list").and_then(|raw| parse_id_list(raw)),
    ) else {
        return bad_request("item_id_list");
    };
    for (position, item_id) in ids.iter().enumerate() {
        if let Some(item) = store.items.get_mut(item_id).filter(|i| i.project_id == project_id) {
            item.item_order = position as i64 + 1;
        }
    }
    marker("ok")
}

async fn update_recurring_date(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(ids) = params.get("ids").and_then(|raw| parse_id_list(raw)) else {
        return bad_request("ids");
    };
    // Dates are not interpreted here; recurring items come back unchanged.
    let items: Vec<Item> = ids.iter().filter_map(|id| store.items.get(id).cloned()).collect();
    Json(items).into_response()
}

async fn set_checked(db: Db, params: Params, checked: Option<i64>) -> Response {
    let mut store = db.write().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(ids) = params.get("ids").and_then(|raw| parse_id_list(raw)) else {
        return bad_request("ids");
    };
    for item_id in ids {
        match checked {
            Some(flag) => {
                if let Some(item) = store.items.get_mut(&item_id) {
                    item.checked = flag;
                }
            }
            None => {
                store.items.remove(&item_id);
            }
        }
    }
    marker("ok")
}

async fn delete_items(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    set_checked(db, params, None).await
}

async fn complete_items(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    set_checked(db, params, Some(1)).await
}

async fn uncomplete_items(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    set_checked(db, params, Some(0)).await
}

// -- query ------------------------------------------------------------------

/// `p1`..`p4` filter by priority (`p1` is the highest, stored as 4); anything
/// else is a case-insensitive content search over open items.
fn run_query(store: &Store, query: &str) -> (&'static str, Vec<Item>) {
    let open = store.items.values().filter(|item| item.checked == 0);
    let priority = query
        .strip_prefix('p')
        .and_then(|n| n.parse::<i64>().ok())
        .filter(|n| (1..=4).contains(n));
    match priority {
        Some(p) => ("priority", open.filter(|item| item.priority == 5 - p).cloned().collect()),
        None => {
            let needle = query.trim_matches('"').to_lowercase();
            let found = open
                .filter(|item| item.content.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            ("search", found)
        }
    }
}

async fn query(State(db): State<Db>, Form(params): Form<Params>) -> Response {
    let store = db.read().await;
    if store.session_user(&params).is_none() {
        return unauthorized();
    }
    let Some(queries) = params.get("queries").and_then(|raw| parse_query_list(raw)) else {
        return bad_request("queries");
    };
    let as_count = params.get("as_count").is_some_and(|v| v.as_str() == "1");

    let results: Vec<serde_json::Value> = queries
        .iter()
        .map(|q| {
            let (kind, items) = run_query(&store, q);
            let data = if as_count {
                serde_json::json!(items.len())
            } else {
                serde_json::json!(items)
            };
            serde_json::json!({ "type": kind, "query": q, "data": data })
        })
        .collect();
    Json(results).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_id_lists() {
        assert_eq!(parse_id_list("[1,2,3]"), Some(vec![1, 2, 3]));
        assert_eq!(parse_id_list("[42]"), Some(vec![42]));
        assert_eq!(parse_id_list("[]"), Some(Vec::new()));
        assert_eq!(parse_id_list("1,2"), None);
        assert_eq!(parse_id_list("[1,x]"), None);
    }

    #[test]
    fn query_lists_keep_caller_quoting() {
        assert_eq!(
            parse_query_list("[overdue,\"milk\"]"),
            Some(vec!["overdue".to_string(), "\"milk\"".to_string()])
        );
        assert_eq!(parse_query_list("overdue"), None);
    }

    #[test]
    fn user_serialization_hides_password() {
        let user = User {
            id: 1,
            email: "me@example.com".to_string(),
            full_name: "Me".to_string(),
            timezone: "UTC".to_string(),
            api_token: "tok".to_string(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["api_token"], "tok");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn labels_are_collected_from_content() {
        let mut store = Store::default();
        store.collect_labels("call mom @phone @home @");
        assert!(store.labels.contains_key("phone"));
        assert!(store.labels.contains_key("home"));
        assert_eq!(store.labels.len(), 2);
    }

    #[test]
    fn priority_queries_map_to_stored_priority() {
        let mut store = Store::default();
        let item = Item {
            id: 1,
            project_id: 1,
            content: "Urgent".to_string(),
            date_string: None,
            due_date: None,
            priority: 4,
            indent: 1,
            item_order: 1,
            checked: 0,
        };
        store.items.insert(1, item);
        let (kind, found) = run_query(&store, "p1");
        assert_eq!(kind, "priority");
        assert_eq!(found.len(), 1);
        let (kind, found) = run_query(&store, "urgent");
        assert_eq!(kind, "search");
        assert_eq!(found.len(), 1);
        assert!(run_query(&store, "p4").1.is_empty());
    }
}
