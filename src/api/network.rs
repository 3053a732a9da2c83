//! Network tab: devices, printers, settings and backend-side actions.

use serde_json::{Value, json};

use super::client::{FetchOptions, HelpToolClient, cache_keys, decode};
use super::types::{ApiError, CommandResult, NetworkDevice, PingResult};

const SETTINGS_PATH: &str = "/api/network/settings";
const DEVICES_PATH: &str = "/api/network/devices";
const PRINTERS_PATH: &str = "/api/printers";
const PING_PATH: &str = "/api/network/ping";
const SHORTCUTS_PATH: &str = "/api/network/shortcuts";
const INSTALL_PATH: &str = "/api/network/install";
const OPEN_PATH_PATH: &str = "/api/network/open-path";
const OPEN_TOOL_PATH: &str = "/api/network/open-tool";
const DIAGNOSTICS_PATH: &str = "/api/network/diagnostics";
const DUAL_EXPLORER_PATH: &str = "/api/network/open-dual-explorer";
const REMOTE_SESSION_PATH: &str = "/api/network/remote-session";

/// Tools the backend can open via `/api/network/open-tool`.
pub const NETWORK_TOOLS: [&str; 4] = ["network-explorer", "dual-explorer", "remote-desktop", "shared-drives"];

impl HelpToolClient {
    /// Network settings, cached under `network-settings` with the slow TTL.
    /// `None` when the backend is unreachable.
    ///
    /// # Errors
    ///
    /// Never fails on HTTP errors; kept fallible for symmetry with other calls.
    pub async fn network_settings(&self) -> Result<Option<Value>, ApiError> {
        let options = FetchOptions::new()
            .cache_key(cache_keys::NETWORK_SETTINGS)
            .ttl(self.ttl_slow())
            .allow_error(true);
        self.fetch_json(SETTINGS_PATH, &options).await
    }

    /// Backend devices, cached under `network-devices`. Empty on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] for an unexpected body.
    pub async fn network_devices(&self) -> Result<Vec<NetworkDevice>, ApiError> {
        self.cached_list(DEVICES_PATH, cache_keys::NETWORK_DEVICES, self.ttl_fast())
            .await
    }

    /// Like [`HelpToolClient::network_devices`] but reports whether the backend
    /// answered, so callers can fall back to the local store alone.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] for an unexpected body.
    pub async fn network_devices_checked(&self) -> Result<Option<Vec<NetworkDevice>>, ApiError> {
        let options = FetchOptions::new()
            .cache_key(cache_keys::NETWORK_DEVICES)
            .ttl(self.ttl_fast())
            .allow_error(true);
        match self.fetch_json(DEVICES_PATH, &options).await? {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(Vec::new())),
            Some(value) => decode(value).map(Some),
        }
    }

    /// Printers, cached under `printers` with the slow TTL. Empty on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] for an unexpected body.
    pub async fn printers(&self) -> Result<Vec<Value>, ApiError> {
        self.cached_list(PRINTERS_PATH, cache_keys::PRINTERS, self.ttl_slow())
            .await
    }

    /// Ping a host or device id from the backend.
    ///
    /// Sends both `host` and `deviceId`; backends read one or the other.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank target, or the request error.
    pub async fn ping(&self, target: &str) -> Result<PingResult, ApiError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ApiError::Validation("ping target is required".to_owned()));
        }
        let result: PingResult = decode(
            self.post(PING_PATH, json!({ "host": target, "deviceId": target }))
                .await?,
        )?;
        tracing::info!(%target, reachable = result.reachable(), "ping");
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn network_shortcuts(&self) -> Result<Vec<Value>, ApiError> {
        self.get(SHORTCUTS_PATH).await
    }

    /// Ask the backend to install a program on the network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank name, or the request error.
    pub async fn install_program(&self, program_name: &str) -> Result<CommandResult, ApiError> {
        let program_name = program_name.trim();
        if program_name.is_empty() {
            return Err(ApiError::Validation("program name is required".to_owned()));
        }
        decode(self.post(INSTALL_PATH, json!({ "programName": program_name })).await?)
    }

    /// Open a UNC path in the backend host's file explorer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank path, or the request error.
    pub async fn open_network_path(&self, path: &str) -> Result<CommandResult, ApiError> {
        if path.trim().is_empty() {
            return Err(ApiError::Validation("network path is required".to_owned()));
        }
        decode(self.post(OPEN_PATH_PATH, json!({ "path": path })).await?)
    }

    /// Open one of [`NETWORK_TOOLS`] on the backend host.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an unknown tool, or the request error.
    pub async fn open_network_tool(&self, tool: &str) -> Result<CommandResult, ApiError> {
        if !NETWORK_TOOLS.contains(&tool) {
            return Err(ApiError::Validation(format!("unknown network tool: {tool}")));
        }
        decode(self.post(OPEN_TOOL_PATH, json!({ "tool": tool })).await?)
    }

    /// Open the dual-pane explorer on the backend host, pointed at a device.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank id, or the request error.
    pub async fn open_dual_explorer(&self, device_id: &str) -> Result<CommandResult, ApiError> {
        self.device_action(DUAL_EXPLORER_PATH, device_id).await
    }

    /// Start a remote desktop session to a device from the backend host.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank id, or the request error.
    pub async fn remote_session(&self, device_id: &str) -> Result<CommandResult, ApiError> {
        self.device_action(REMOTE_SESSION_PATH, device_id).await
    }

    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn network_diagnostics(&self) -> Result<Value, ApiError> {
        self.get(DIAGNOSTICS_PATH).await
    }

    async fn device_action(&self, path: &str, device_id: &str) -> Result<CommandResult, ApiError> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Err(ApiError::Validation("device id is required".to_owned()));
        }
        let result: CommandResult = decode(self.post(path, json!({ "deviceId": device_id })).await?)?;
        tracing::info!(%path, %device_id, success = result.success, "device action");
        Ok(result)
    }
}

#[cfg(test)]
#[path = "network_test.rs"]
mod tests;
