//! System info and connection status.

use super::client::{FetchOptions, HelpToolClient, decode};
use super::types::{ApiError, SystemInfo};

const SYSTEM_INFO_PATH: &str = "/api/system/info";

impl HelpToolClient {
    /// Fetch `/api/system/info`, always bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns the request or parse error.
    pub async fn system_info(&self) -> Result<SystemInfo, ApiError> {
        let options = FetchOptions::new().bust(true);
        match self.fetch_json(SYSTEM_INFO_PATH, &options).await? {
            Some(value) => decode(value),
            None => Ok(SystemInfo::default()),
        }
    }

    /// `true` when the backend answers `/api/system/info`.
    pub async fn is_online(&self) -> bool {
        self.system_info()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "backend offline"))
            .is_ok()
    }
}

#[cfg(test)]
#[path = "system_test.rs"]
mod tests;
