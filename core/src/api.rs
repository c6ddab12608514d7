//! Stateless request builder for the Todoist `/API/<name>` endpoints.
//!
//! # Design
//! `Api` holds only a `base_url`. Every remote operation has a `build_*`
//! method that checks the call's preconditions and produces an `HttpRequest`;
//! nothing here performs I/O or touches session state. The session token is
//! passed in by the caller, and a missing token or required field comes back
//! as a `UsageError` before any request exists.
//!
//! Reads and bulk id-list operations are GETs with a query string. Account,
//! project, label and item CRUD are form POSTs.

use crate::error::UsageError;
use crate::http::{HttpMethod, HttpRequest};
use crate::params::{required, IdList, Params};
use crate::types::{
    ItemUpdate, NewItem, NewProject, ProjectUpdate, Query, Registration, UserUpdate,
};

pub const DEFAULT_BASE_URL: &str = "https://todoist.com";

/// The service spells the project reference this way on its write endpoints.
const PROJECT_REF: &str = "proejct_id";

/// Builds `HttpRequest` values for each remote operation.
#[derive(Debug, Clone)]
pub struct Api {
    base_url: String,
}

impl Default for Api {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Api {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/API/{name}", self.base_url)
    }

    fn get(&self, name: &str, params: Params) -> HttpRequest {
        let mut path = self.endpoint(name);
        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.encode());
        }
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn post(&self, name: &str, params: Params) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.endpoint(name),
            headers: vec![(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(params.encode()),
        }
    }

    // -- account ------------------------------------------------------------

    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest, UsageError> {
        let email = required("email", Some(email))?;
        let password = required("password", Some(password))?;
        Ok(self.post(
            "login",
            Params::new().text("email", email).text("password", password),
        ))
    }

    pub fn build_get_timezones(&self) -> HttpRequest {
        self.get("getTimezones", Params::new())
    }

    pub fn build_register(&self, input: &Registration) -> Result<HttpRequest, UsageError> {
        let params = Params::new()
            .text("email", required("email", Some(input.email.as_str()))?)
            .text("full_name", required("full_name", Some(input.full_name.as_str()))?)
            .text("password", required("password", Some(input.password.as_str()))?)
            .text("timezone", required("timezone", Some(input.timezone.as_str()))?);
        Ok(self.post("register", params))
    }

    pub fn build_update_user(
        &self,
        token: Option<&str>,
        input: &UserUpdate,
    ) -> Result<HttpRequest, UsageError> {
        let params = Params::new()
            .text("token", require_token(token)?)
            .opt("email", input.email.as_deref())
            .opt("full_name", input.full_name.as_deref())
            .opt("password", input.password.as_deref())
            .opt("timezone", input.timezone.as_deref());
        Ok(self.post("updateUser", params))
    }

    // -- projects -----------------------------------------------------------

    pub fn build_get_projects(&self, token: Option<&str>) -> Result<HttpRequest, UsageError> {
        let params = Params::new().text("token", require_token(token)?);
        Ok(self.get("getProjects", params))
    }

    /// The token is sent when present but not required.
    pub fn build_get_project(&self, token: Option<&str>, project_id: u64) -> HttpRequest {
        let params = Params::new().token(token).text("project_id", project_id);
        self.get("getProject", params)
    }

    pub fn build_add_project(
        &self,
        token: Option<&str>,
        input: &NewProject,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text("name", required("name", Some(input.name.as_str()))?)
            .text("token", token)
            .opt("color", input.color)
            .opt("indent", input.indent)
            .opt("order", input.order);
        Ok(self.post("addProject", params))
    }

    pub fn build_update_project(
        &self,
        token: Option<&str>,
        input: &ProjectUpdate,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text(PROJECT_REF, required_id("project_id", input.project_id)?)
            .text("token", token)
            .opt("name", input.name.as_deref())
            .opt("color", input.color)
            .opt("indent", input.indent);
        Ok(self.post("updateProject", params))
    }

    pub fn build_delete_project(
        &self,
        token: Option<&str>,
        project_id: u64,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text("project_id", required_id("project_id", project_id)?)
            .text("token", token);
        Ok(self.post("deleteProject", params))
    }

    // -- labels -------------------------------------------------------------

    pub fn build_get_labels(&self, token: Option<&str>) -> Result<HttpRequest, UsageError> {
        let params = Params::new().text("token", require_token(token)?);
        Ok(self.get("getLabels", params))
    }

    pub fn build_update_label(
        &self,
        token: Option<&str>,
        old_name: &str,
        new_name: &str,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text("old_name", required("old_name", Some(old_name))?)
            .text("new_name", required("new_name", Some(new_name))?)
            .text("token", token);
        Ok(self.post("updateLabel", params))
    }

    pub fn build_delete_label(
        &self,
        token: Option<&str>,
        name: &str,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text("name", required("name", Some(name))?)
            .text("token", token);
        Ok(self.post("deleteLabel", params))
    }

    // -- items --------------------------------------------------------------

    pub fn build_get_uncompleted_items(
        &self,
        token: Option<&str>,
        project_id: u64,
        js_date: bool,
    ) -> Result<HttpRequest, UsageError> {
        self.build_project_items("getUncompletedItems", token, project_id, js_date)
    }

    pub fn build_get_completed_items(
        &self,
        token: Option<&str>,
        project_id: u64,
        js_date: bool,
    ) -> Result<HttpRequest, UsageError> {
        self.build_project_items("getCompletedItems", token, project_id, js_date)
    }

    fn build_project_items(
        &self,
        name: &str,
        token: Option<&str>,
        project_id: u64,
        js_date: bool,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text("project_id", required_id("project_id", project_id)?)
            .text("token", token)
            .flag("js_date", js_date);
        Ok(self.get(name, params))
    }

    pub fn build_get_items_by_id(
        &self,
        token: Option<&str>,
        ids: &IdList,
        js_date: bool,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .literal("ids", ids.render("ids")?)
            .text("token", token)
            .flag("js_date", js_date);
        Ok(self.get("getItemsById", params))
    }

    pub fn build_add_item(
        &self,
        token: Option<&str>,
        input: &NewItem,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text(PROJECT_REF, required_id("project_id", input.project_id)?)
            .text("content", required("content", Some(input.content.as_str()))?)
            .text("token", token)
            .opt("date_string", input.date_string.as_deref())
            .opt("priority", input.priority)
            .opt("indent", input.indent)
            .opt("item_order", input.item_order)
            .flag("js_date", input.js_date);
        Ok(self.post("addItem", params))
    }

    pub fn build_update_item(
        &self,
        token: Option<&str>,
        input: &ItemUpdate,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text("id", required_id("id", input.id)?)
            .text("token", token)
            .opt(PROJECT_REF, input.project_id)
            .opt("content", input.content.as_deref())
            .opt("date_string", input.date_string.as_deref())
            .opt("priority", input.priority)
            .opt("indent", input.indent)
            .opt("item_order", input.item_order)
            .flag("js_date", input.js_date);
        Ok(self.post("updateItem", params))
    }

    pub fn build_update_orders(
        &self,
        token: Option<&str>,
        project_id: u64,
        ids: &IdList,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .text("project_id", required_id("project_id", project_id)?)
            .literal("item_id_list", ids.render("item_id_list")?)
            .text("token", token);
        Ok(self.get("updateOrders", params))
    }

    pub fn build_update_recurring_date(
        &self,
        token: Option<&str>,
        ids: &IdList,
        js_date: bool,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .literal("ids", ids.render("ids")?)
            .text("token", token)
            .flag("js_date", js_date);
        Ok(self.get("updateRecurringDate", params))
    }

    pub fn build_delete_items(
        &self,
        token: Option<&str>,
        ids: &IdList,
    ) -> Result<HttpRequest, UsageError> {
        self.build_id_list("deleteItems", token, ids)
    }

    pub fn build_complete_items(
        &self,
        token: Option<&str>,
        ids: &IdList,
    ) -> Result<HttpRequest, UsageError> {
        self.build_id_list("completeItems", token, ids)
    }

    pub fn build_uncomplete_items(
        &self,
        token: Option<&str>,
        ids: &IdList,
    ) -> Result<HttpRequest, UsageError> {
        self.build_id_list("uncompleteItems", token, ids)
    }

    fn build_id_list(
        &self,
        name: &str,
        token: Option<&str>,
        ids: &IdList,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        let params = Params::new()
            .literal("ids", ids.render("ids")?)
            .text("token", token);
        Ok(self.get(name, params))
    }

    // -- query --------------------------------------------------------------

    pub fn build_query(
        &self,
        token: Option<&str>,
        query: &Query,
    ) -> Result<HttpRequest, UsageError> {
        let token = require_token(token)?;
        if query.queries.is_empty() {
            return Err(UsageError::MissingField("queries"));
        }
        let params = Params::new()
            .list("queries", &query.queries)
            .text("token", token)
            .flag("as_count", query.as_count)
            .flag("js_date", query.js_date);
        Ok(self.post("query", params))
    }
}

fn require_token(token: Option<&str>) -> Result<&str, UsageError> {
    match token {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(UsageError::MissingToken),
    }
}

/// Zero never names a real entity on the service.
fn required_id(field: &'static str, id: u64) -> Result<u64, UsageError> {
    if id == 0 {
        return Err(UsageError::MissingField(field));
    }
    Ok(id)
}
