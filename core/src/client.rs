//! Session facade over `Api` and a `Transport`.
//!
//! # Design
//! `Client` owns the mutable session: the token issued by `login` or
//! `register`, and the text of the most recent operational failure. Each
//! public method is one blocking round-trip: build the request (usage errors
//! stop here, before the transport is touched), execute it, check the status,
//! apply the endpoint's body marker, decode.
//!
//! Every method takes `&mut self`. A client shared between threads needs an
//! external lock; there is no internal synchronization.

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::Api;
use crate::codec::{JsonCodec, SerdeJsonCodec};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, Transport};
use crate::params::IdList;
use crate::response::{
    check_status, decode, extract_token, first, into_list, is_ok, reject_marker, require_marker,
    ID_MARKER, LOGIN_ERROR, PROJECT_NOT_FOUND, TOKEN_FIELD,
};
use crate::types::{
    ItemUpdate, NewItem, NewProject, ProjectUpdate, Query, Registration, UserUpdate,
};

/// Blocking client for the Todoist API.
pub struct Client {
    api: Api,
    token: Option<String>,
    last_error: Option<String>,
    transport: Box<dyn Transport + Send>,
    codec: Box<dyn JsonCodec + Send>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let transport = config
            .transport
            .unwrap_or_else(|| default_transport(&config.transport_options));
        Self {
            api: Api::new(&config.base_url),
            token: config.token.filter(|t| !t.is_empty()),
            last_error: None,
            transport,
            codec: config.codec.unwrap_or_else(|| Box::new(SerdeJsonCodec)),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Description of the latest operational failure: a status line or a raw
    /// response body. Usage errors never land here.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // -- account ------------------------------------------------------------

    /// Log in and keep the returned token for later calls.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Value, ApiError> {
        let request = self.api.build_login(email, password)?;
        let result = self.roundtrip("login", &request).and_then(|body| {
            reject_marker(&body, LOGIN_ERROR)?;
            let payload = decode(self.codec.as_ref(), &body)?;
            let token = extract_token(&payload, &body)?;
            Ok((payload, token))
        });
        let (payload, token) = self.record("login", result)?;
        self.token = Some(token);
        Ok(payload)
    }

    /// Create an account and keep the returned token for later calls.
    pub fn register(&mut self, input: &Registration) -> Result<Value, ApiError> {
        let request = self.api.build_register(input)?;
        let result = self.roundtrip("register", &request).and_then(|body| {
            require_marker(&body, TOKEN_FIELD)?;
            let payload = decode(self.codec.as_ref(), &body)?;
            let token = extract_token(&payload, &body)?;
            Ok((payload, token))
        });
        let (payload, token) = self.record("register", result)?;
        self.token = Some(token);
        Ok(payload)
    }

    /// Update account fields. The stored token is left as it is.
    pub fn update_user(&mut self, input: &UserUpdate) -> Result<Value, ApiError> {
        let request = self.api.build_update_user(self.token(), input)?;
        self.fetch_marked("update_user", &request, |body| {
            require_marker(body, TOKEN_FIELD)
        })
    }

    pub fn get_timezones(&mut self) -> Result<Vec<Value>, ApiError> {
        let request = self.api.build_get_timezones();
        self.fetch_list("get_timezones", &request)
    }

    // -- projects -----------------------------------------------------------

    pub fn get_projects(&mut self) -> Result<Vec<Value>, ApiError> {
        let request = self.api.build_get_projects(self.token())?;
        self.fetch_list("get_projects", &request)
    }

    pub fn get_project(&mut self, project_id: u64) -> Result<Value, ApiError> {
        let request = self.api.build_get_project(self.token(), project_id);
        self.fetch("get_project", &request)
    }

    pub fn add_project(&mut self, input: &NewProject) -> Result<Value, ApiError> {
        let request = self.api.build_add_project(self.token(), input)?;
        self.fetch_marked("add_project", &request, |body| require_marker(body, ID_MARKER))
    }

    pub fn update_project(&mut self, input: &ProjectUpdate) -> Result<Value, ApiError> {
        let request = self.api.build_update_project(self.token(), input)?;
        self.fetch_marked("update_project", &request, |body| {
            reject_marker(body, PROJECT_NOT_FOUND)
        })
    }

    pub fn delete_project(&mut self, project_id: u64) -> Result<bool, ApiError> {
        let request = self.api.build_delete_project(self.token(), project_id)?;
        self.answer("delete_project", &request)
    }

    // -- labels -------------------------------------------------------------

    /// Labels as returned by the service, typically an object keyed by name.
    pub fn get_labels(&mut self) -> Result<Value, ApiError> {
        let request = self.api.build_get_labels(self.token())?;
        self.fetch("get_labels", &request)
    }

    pub fn update_label(&mut self, old_name: &str, new_name: &str) -> Result<bool, ApiError> {
        let request = self.api.build_update_label(self.token(), old_name, new_name)?;
        self.answer("update_label", &request)
    }

    pub fn delete_label(&mut self, name: &str) -> Result<bool, ApiError> {
        let request = self.api.build_delete_label(self.token(), name)?;
        self.answer("delete_label", &request)
    }

    // -- items --------------------------------------------------------------

    pub fn get_uncompleted_items(
        &mut self,
        project_id: u64,
        js_date: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let request = self
            .api
            .build_get_uncompleted_items(self.token(), project_id, js_date)?;
        self.fetch_list("get_uncompleted_items", &request)
    }

    pub fn get_completed_items(
        &mut self,
        project_id: u64,
        js_date: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let request = self
            .api
            .build_get_completed_items(self.token(), project_id, js_date)?;
        self.fetch_list("get_completed_items", &request)
    }

    /// Items for one id or a list of ids; both forms send the same request.
    pub fn get_items_by_id(
        &mut self,
        ids: impl Into<IdList>,
        js_date: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let request = self
            .api
            .build_get_items_by_id(self.token(), &ids.into(), js_date)?;
        self.fetch_list("get_items_by_id", &request)
    }

    /// The single item with `id`.
    pub fn get_item_by_id(&mut self, id: u64, js_date: bool) -> Result<Value, ApiError> {
        let items = self.get_items_by_id(id, js_date)?;
        let result = first(items);
        self.record("get_item_by_id", result)
    }

    pub fn add_item(&mut self, input: &NewItem) -> Result<Value, ApiError> {
        let request = self.api.build_add_item(self.token(), input)?;
        self.fetch_marked("add_item", &request, |body| require_marker(body, ID_MARKER))
    }

    pub fn update_item(&mut self, input: &ItemUpdate) -> Result<Value, ApiError> {
        let request = self.api.build_update_item(self.token(), input)?;
        self.fetch_marked("update_item", &request, |body| require_marker(body, ID_MARKER))
    }

    /// Reorder the items of a project to match `ids`.
    pub fn update_orders(
        &mut self,
        project_id: u64,
        ids: impl Into<IdList>,
    ) -> Result<bool, ApiError> {
        let request = self
            .api
            .build_update_orders(self.token(), project_id, &ids.into())?;
        self.answer("update_orders", &request)
    }

    /// Advance recurring items to their next date; returns the updated items.
    pub fn update_recurring_date(
        &mut self,
        ids: impl Into<IdList>,
        js_date: bool,
    ) -> Result<Vec<Value>, ApiError> {
        let request = self
            .api
            .build_update_recurring_date(self.token(), &ids.into(), js_date)?;
        self.fetch_list("update_recurring_date", &request)
    }

    pub fn delete_items(&mut self, ids: impl Into<IdList>) -> Result<bool, ApiError> {
        let request = self.api.build_delete_items(self.token(), &ids.into())?;
        self.answer("delete_items", &request)
    }

    pub fn complete_items(&mut self, ids: impl Into<IdList>) -> Result<bool, ApiError> {
        let request = self.api.build_complete_items(self.token(), &ids.into())?;
        self.answer("complete_items", &request)
    }

    pub fn uncomplete_items(&mut self, ids: impl Into<IdList>) -> Result<bool, ApiError> {
        let request = self.api.build_uncomplete_items(self.token(), &ids.into())?;
        self.answer("uncomplete_items", &request)
    }

    // -- query --------------------------------------------------------------

    /// One result per query string. See `Query` for the quoting rules.
    pub fn query(&mut self, query: &Query) -> Result<Vec<Value>, ApiError> {
        let request = self.api.build_query(self.token(), query)?;
        self.fetch_list("query", &request)
    }

    /// The result of the first query string.
    pub fn query_first(&mut self, query: &Query) -> Result<Value, ApiError> {
        let results = self.query(query)?;
        let result = first(results);
        self.record("query_first", result)
    }

    // -- plumbing -----------------------------------------------------------

    /// Execute `request` and return the body of a 2xx response.
    fn roundtrip(&self, op: &'static str, request: &HttpRequest) -> Result<String, ApiError> {
        debug!(op, method = request.method.as_str(), "dispatching request");
        let response = self.transport.execute(request)?;
        debug!(op, status = response.status, bytes = response.body.len(), "response received");
        check_status(&response)?;
        Ok(response.body)
    }

    /// Store the text of an operational failure as the last error.
    fn record<T>(&mut self, op: &'static str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            if !err.is_usage() {
                warn!(op, error = %err, "request failed");
                self.last_error = Some(err.to_string());
            }
        }
        result
    }

    fn fetch(&mut self, op: &'static str, request: &HttpRequest) -> Result<Value, ApiError> {
        let result = self
            .roundtrip(op, request)
            .and_then(|body| decode(self.codec.as_ref(), &body));
        self.record(op, result)
    }

    fn fetch_list(
        &mut self,
        op: &'static str,
        request: &HttpRequest,
    ) -> Result<Vec<Value>, ApiError> {
        self.fetch(op, request).map(into_list)
    }

    fn fetch_marked(
        &mut self,
        op: &'static str,
        request: &HttpRequest,
        check: impl FnOnce(&str) -> Result<(), ApiError>,
    ) -> Result<Value, ApiError> {
        let result = self.roundtrip(op, request).and_then(|body| {
            check(&body)?;
            decode(self.codec.as_ref(), &body)
        });
        self.record(op, result)
    }

    /// Boolean endpoints: `true` iff the body mentions `ok`. A `false` answer
    /// keeps the body as the last error.
    fn answer(&mut self, op: &'static str, request: &HttpRequest) -> Result<bool, ApiError> {
        let result = self.roundtrip(op, request);
        let body = self.record(op, result)?;
        if is_ok(&body) {
            return Ok(true);
        }
        warn!(op, "service did not acknowledge");
        self.last_error = Some(body);
        Ok(false)
    }
}

#[cfg(feature = "ureq")]
fn default_transport(options: &crate::config::TransportOptions) -> Box<dyn Transport + Send> {
    Box::new(crate::transport::UreqTransport::new(options))
}

#[cfg(not(feature = "ureq"))]
fn default_transport(_options: &crate::config::TransportOptions) -> Box<dyn Transport + Send> {
    use crate::error::TransportError;
    use crate::http::HttpResponse;

    Box::new(|_: &HttpRequest| -> Result<HttpResponse, TransportError> {
        Err(TransportError::new("no transport configured"))
    })
}
