//! Tools and worksets.

use serde_json::{Value, json};

use super::client::{HelpToolClient, cache_keys, decode, decode_record};
use super::types::{ApiError, CommandResult, Tool, Workset};

const TOOLS_PATH: &str = "/api/tools";
const WORKSETS_PATH: &str = "/api/worksets";

fn tool_path(tool_id: i64) -> String {
    format!("{TOOLS_PATH}/{tool_id}")
}

fn workset_tools_path(workset_id: i64) -> String {
    format!("{WORKSETS_PATH}/{workset_id}/tools")
}

impl HelpToolClient {
    // =========================================================================
    // TOOLS
    // =========================================================================

    /// All tools, cached under `tools`. Empty when the backend is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the backend answers with something other
    /// than a list of tools.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, ApiError> {
        self.cached_list(TOOLS_PATH, cache_keys::TOOLS, self.ttl_fast())
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the tool does not exist.
    pub async fn get_tool(&self, tool_id: i64) -> Result<Tool, ApiError> {
        self.get(&tool_path(tool_id)).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the tool has no name, or the
    /// request error.
    pub async fn create_tool(&self, tool: &Tool) -> Result<Tool, ApiError> {
        if tool.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(ApiError::Validation("tool name is required".to_owned()));
        }
        let body = serde_json::to_value(tool).map_err(|e| ApiError::Parse(e.to_string()))?;
        let created = self.post(TOOLS_PATH, body).await?;
        self.invalidate_tools();
        decode_record(created, "tool")
    }

    /// Merge `changes` into an existing tool.
    ///
    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown tool.
    pub async fn update_tool(&self, tool_id: i64, changes: Value) -> Result<Tool, ApiError> {
        let updated = self.put(&tool_path(tool_id), changes).await?;
        self.invalidate_tools();
        decode_record(updated, "tool")
    }

    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown tool.
    pub async fn delete_tool(&self, tool_id: i64) -> Result<Tool, ApiError> {
        let deleted = self.delete(&tool_path(tool_id)).await?;
        self.invalidate_tools();
        decode_record(deleted, "tool")
    }

    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown tool.
    pub async fn set_tool_autostart(&self, tool_id: i64, autostart: bool) -> Result<Tool, ApiError> {
        let path = format!("{}/autostart", tool_path(tool_id));
        let updated = self.put(&path, json!({ "autostart": autostart })).await?;
        self.invalidate_tools();
        decode_record(updated, "tool")
    }

    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown tool.
    pub async fn set_tool_admin(&self, tool_id: i64, requires_admin: bool) -> Result<Tool, ApiError> {
        let path = format!("{}/admin", tool_path(tool_id));
        let updated = self.put(&path, json!({ "admin": requires_admin })).await?;
        self.invalidate_tools();
        decode_record(updated, "tool")
    }

    /// Ask the backend to launch a tool.
    ///
    /// # Errors
    ///
    /// Returns the request error; a launch failure comes back as HTTP 500 with
    /// the backend's message.
    pub async fn start_tool(&self, tool_id: i64) -> Result<CommandResult, ApiError> {
        let path = format!("{}/start", tool_path(tool_id));
        decode(self.post(&path, json!({})).await?)
    }

    fn invalidate_tools(&self) {
        self.clear_cache(Some(cache_keys::TOOLS));
        self.clear_cache(Some(cache_keys::WORKSETS));
    }

    // =========================================================================
    // WORKSETS
    // =========================================================================

    /// All worksets with their tools expanded, cached under
    /// `worksets_with_tools`. Empty when the backend is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] for an unexpected body.
    pub async fn list_worksets(&self) -> Result<Vec<Workset>, ApiError> {
        self.cached_list(WORKSETS_PATH, cache_keys::WORKSETS, self.ttl_fast())
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank name, or the request error.
    pub async fn create_workset(&self, name: &str, description: Option<&str>) -> Result<Workset, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("workset name is required".to_owned()));
        }
        let mut body = json!({ "name": name, "tools": [] });
        if let Some(description) = description {
            body["description"] = Value::String(description.to_owned());
        }
        let created = self.post(WORKSETS_PATH, body).await?;
        self.clear_cache(Some(cache_keys::WORKSETS));
        decode_record(created, "workset")
    }

    /// # Errors
    ///
    /// Returns the request error.
    pub async fn workset_tools(&self, workset_id: i64) -> Result<Vec<Tool>, ApiError> {
        self.get(&workset_tools_path(workset_id)).await
    }

    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown workset.
    pub async fn add_tool_to_workset(&self, workset_id: i64, tool_id: i64) -> Result<(), ApiError> {
        self.post(&workset_tools_path(workset_id), json!({ "tool_id": tool_id }))
            .await?;
        self.clear_cache(Some(cache_keys::WORKSETS));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the request error, e.g. 404 for an unknown workset.
    pub async fn remove_tool_from_workset(&self, workset_id: i64, tool_id: i64) -> Result<(), ApiError> {
        let path = format!("{}/{tool_id}", workset_tools_path(workset_id));
        self.delete(&path).await?;
        self.clear_cache(Some(cache_keys::WORKSETS));
        Ok(())
    }
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;
