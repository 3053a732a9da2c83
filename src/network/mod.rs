//! Network devices and saved links.
//!
//! The backend reports devices it knows about; devices and links added by
//! hand live in a [`LocalStore`] on disk. Listings show both, merged by id.

pub mod store;

pub use store::{LocalStore, StoreError};

use std::collections::HashMap;

use crate::api::types::NetworkDevice;

/// Merge backend and locally added devices by id.
///
/// Each id keeps the position where it first appeared and the record that
/// came last, with local devices after backend ones. Devices without an id
/// share one slot. With no local devices the backend list is returned as is.
#[must_use]
pub fn merge_devices(backend: Vec<NetworkDevice>, local: Vec<NetworkDevice>) -> Vec<NetworkDevice> {
    if local.is_empty() {
        return backend;
    }

    let mut merged: Vec<NetworkDevice> = Vec::with_capacity(backend.len() + local.len());
    let mut slots: HashMap<Option<String>, usize> = HashMap::new();
    for device in backend.into_iter().chain(local) {
        match slots.get(&device.id) {
            Some(&index) => merged[index] = device,
            None => {
                slots.insert(device.id.clone(), merged.len());
                merged.push(device);
            }
        }
    }
    merged
}

/// Devices matching a search term and an optional exact type.
///
/// The term is matched case-insensitively against id, name and hostname,
/// and as a plain substring against the IP fields.
#[must_use]
pub fn filter_devices<'a>(devices: &'a [NetworkDevice], query: &str, kind: Option<&str>) -> Vec<&'a NetworkDevice> {
    let query = query.trim().to_lowercase();
    let kind = kind.filter(|k| !k.is_empty());

    devices
        .iter()
        .filter(|d| kind.is_none_or(|k| d.kind.as_deref() == Some(k)))
        .filter(|d| query.is_empty() || device_matches(d, &query))
        .collect()
}

fn device_matches(device: &NetworkDevice, query: &str) -> bool {
    let extra = |key: &str| device.extra.get(key).and_then(|v| v.as_str());
    let named = [device.id.as_deref(), device.name.as_deref(), extra("hostname")]
        .into_iter()
        .flatten()
        .any(|v| v.to_lowercase().contains(query));
    named
        || [device.ip.as_deref(), extra("ip_address")]
            .into_iter()
            .flatten()
            .any(|v| v.contains(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device(id: &str, name: &str) -> NetworkDevice {
        NetworkDevice {
            id: Some(id.to_owned()),
            name: Some(name.to_owned()),
            ..NetworkDevice::default()
        }
    }

    fn names(devices: &[NetworkDevice]) -> Vec<&str> {
        devices.iter().filter_map(|d| d.name.as_deref()).collect()
    }

    #[test]
    fn local_replaces_backend_in_place() {
        let backend = vec![device("1", "router"), device("2", "nas"), device("3", "printer")];
        let local = vec![device("9", "laptop"), device("2", "nas (local)")];

        let merged = merge_devices(backend, local);
        assert_eq!(names(&merged), ["router", "nas (local)", "printer", "laptop"]);
    }

    #[test]
    fn local_only_when_backend_empty() {
        let merged = merge_devices(Vec::new(), vec![device("10.0.0.5", "pc")]);
        assert_eq!(names(&merged), ["pc"]);
    }

    fn anonymous(name: &str) -> NetworkDevice {
        NetworkDevice { name: Some(name.to_owned()), ..NetworkDevice::default() }
    }

    #[test]
    fn devices_without_id_share_one_slot() {
        let backend = vec![anonymous("a"), device("1", "router"), anonymous("b")];
        let local = vec![anonymous("c"), device("2", "laptop")];

        let merged = merge_devices(backend, local);
        assert_eq!(names(&merged), ["c", "router", "laptop"]);
    }

    #[test]
    fn later_duplicate_ids_win_at_first_position() {
        let backend = vec![device("1", "old"), device("2", "nas"), device("1", "newer")];
        let local = vec![device("2", "nas (local)")];

        let merged = merge_devices(backend, local);
        assert_eq!(names(&merged), ["newer", "nas (local)"]);
    }

    #[test]
    fn backend_untouched_without_local_devices() {
        let backend = vec![anonymous("a"), anonymous("b")];
        assert_eq!(names(&merge_devices(backend, Vec::new())), ["a", "b"]);
    }

    #[test]
    fn filter_by_term_and_type() {
        let mut printer = device("p1", "Drucker Flur");
        printer.kind = Some("printer".into());
        let mut server: NetworkDevice = serde_json::from_value(json!({
            "id": 7, "name": "srv", "type": "server", "hostname": "FILESRV01", "ip_address": "10.0.0.7"
        }))
        .unwrap();
        server.ip = None;
        let devices = vec![printer, server];

        assert_eq!(filter_devices(&devices, "drucker", None).len(), 1);
        assert_eq!(filter_devices(&devices, "filesrv", None)[0].id.as_deref(), Some("7"));
        assert_eq!(filter_devices(&devices, "10.0.0", None).len(), 1);
        assert_eq!(filter_devices(&devices, "", Some("printer")).len(), 1);
        assert!(filter_devices(&devices, "srv", Some("printer")).is_empty());
    }
}
