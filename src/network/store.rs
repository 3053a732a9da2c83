//! JSON-file store for hand-added devices and saved links.
//!
//! Each list lives in its own file under the data directory. A missing file
//! reads as an empty list. Writes go to a temp file first and are renamed
//! into place.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::api::types::{LINK_BROWSERS, NetworkDevice, NetworkLink};

pub const DEVICES_FILE: &str = "network_devices.json";
pub const LINKS_FILE: &str = "network-links.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A device with this IP exists and overwriting was not requested.
    #[error("a device with IP {0} already exists")]
    DuplicateDevice(String),

    #[error("{0}")]
    Invalid(String),
}

/// Fields entered for a new device.
#[derive(Debug, Clone, Default)]
pub struct NewDevice {
    pub name: String,
    pub ip: String,
    pub kind: String,
    pub description: String,
}

pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // DEVICES
    // =========================================================================

    /// # Errors
    ///
    /// Unreadable file or invalid JSON.
    pub async fn devices(&self) -> Result<Vec<NetworkDevice>, StoreError> {
        self.load(DEVICES_FILE).await
    }

    /// Store a device under its IP. The id is the IP and the network path is
    /// the admin share `\\<ip>\c$`. When `overwrite` is set, an existing
    /// device with the same id or IP takes the new values in place and keeps
    /// its `status` and any unknown fields. Returns the stored record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] for a blank name or IP,
    /// [`StoreError::DuplicateDevice`] when the IP is taken and `overwrite`
    /// is false, or an I/O error.
    pub async fn add_device(&self, new: NewDevice, overwrite: bool) -> Result<NetworkDevice, StoreError> {
        let name = new.name.trim();
        let ip = new.ip.trim();
        if name.is_empty() || ip.is_empty() {
            return Err(StoreError::Invalid("device name and IP address are required".to_owned()));
        }

        let device = NetworkDevice {
            id: Some(ip.to_owned()),
            name: Some(name.to_owned()),
            ip: Some(ip.to_owned()),
            kind: Some(new.kind.trim().to_owned()).filter(|k| !k.is_empty()),
            description: Some(new.description.trim().to_owned()).filter(|d| !d.is_empty()),
            created: Some(crate::timestamp_iso()),
            network_path: Some(format!(r"\\{ip}\c$")),
            ..NetworkDevice::default()
        };

        let mut devices = self.devices().await?;
        let existing = devices
            .iter()
            .position(|d| d.id.as_deref() == Some(ip) || d.ip.as_deref() == Some(ip));
        let stored = match existing {
            Some(_) if !overwrite => return Err(StoreError::DuplicateDevice(ip.to_owned())),
            Some(index) => {
                let old = std::mem::take(&mut devices[index]);
                devices[index] = NetworkDevice { status: old.status, extra: old.extra, ..device };
                devices[index].clone()
            }
            None => {
                devices.push(device.clone());
                device
            }
        };
        self.save(DEVICES_FILE, &devices).await?;

        tracing::info!(ip, replaced = existing.is_some(), "device saved");
        Ok(stored)
    }

    /// Returns whether a device was removed.
    ///
    /// # Errors
    ///
    /// Unreadable file, invalid JSON or a failed write.
    pub async fn remove_device(&self, id: &str) -> Result<bool, StoreError> {
        let mut devices = self.devices().await?;
        let before = devices.len();
        devices.retain(|d| d.id.as_deref() != Some(id));
        if devices.len() == before {
            return Ok(false);
        }
        self.save(DEVICES_FILE, &devices).await?;
        Ok(true)
    }

    // =========================================================================
    // LINKS
    // =========================================================================

    /// # Errors
    ///
    /// Unreadable file or invalid JSON.
    pub async fn links(&self) -> Result<Vec<NetworkLink>, StoreError> {
        self.load(LINKS_FILE).await
    }

    /// Append a link. The id is the current unix time in milliseconds.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] for a blank name or URL or an unknown
    /// browser, or an I/O error.
    pub async fn add_link(&self, name: &str, url: &str, browser: &str) -> Result<NetworkLink, StoreError> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(StoreError::Invalid("link name and URL are required".to_owned()));
        }
        if !LINK_BROWSERS.contains(&browser) {
            return Err(StoreError::Invalid(format!(
                "unknown browser '{browser}' (expected one of {})",
                LINK_BROWSERS.join(", ")
            )));
        }

        let mut links = self.links().await?;
        let mut id = unix_millis();
        // Two links added within the same millisecond.
        while links.iter().any(|l| l.id == id) {
            id += 1;
        }
        let link = NetworkLink {
            id,
            name: name.to_owned(),
            url: url.to_owned(),
            browser: browser.to_owned(),
            created: Some(crate::timestamp_iso()),
        };
        links.push(link.clone());
        self.save(LINKS_FILE, &links).await?;
        Ok(link)
    }

    /// Returns whether a link was removed.
    ///
    /// # Errors
    ///
    /// Unreadable file, invalid JSON or a failed write.
    pub async fn remove_link(&self, id: i64) -> Result<bool, StoreError> {
        let mut links = self.links().await?;
        let before = links.len();
        links.retain(|l| l.id != id);
        if links.len() == before {
            return Ok(false);
        }
        self.save(LINKS_FILE, &links).await?;
        Ok(true)
    }

    // =========================================================================
    // FILES
    // =========================================================================

    async fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Json { path, source })
    }

    async fn save<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        let temp_path = path.with_extension("json.tmp");
        let io_err = |source: std::io::Error| StoreError::Io { path: path.clone(), source };

        fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let content = serde_json::to_string_pretty(items).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&temp_path, content).await.map_err(io_err)?;
        fs::rename(&temp_path, &path).await.map_err(io_err)?;

        tracing::debug!(path = %path.display(), count = items.len(), "store saved");
        Ok(())
    }
}

fn unix_millis() -> i64 {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
