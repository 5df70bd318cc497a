//! The device roster: the fixed list of printers being monitored.
//!
//! The roster is loaded once at startup and never mutated. Identifiers
//! are only meaningful within one roster; the same id may legitimately
//! appear twice (two physical printers that were given the same label),
//! so nothing here deduplicates.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One monitored printer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    /// Roster-scoped identifier, e.g. `PHARI064`.
    pub id: String,
    /// IPv4 literal the printer answers on.
    pub address: String,
    /// Free-text location label. Not unique.
    pub location: String,
}

impl Device {
    pub fn new(id: &str, address: &str, location: &str) -> Self {
        Self {
            id: id.to_string(),
            address: address.to_string(),
            location: location.to_string(),
        }
    }

    /// Parsed address, or `None` if it is not an IPv4 literal.
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.address.trim().parse().ok()
    }
}

/// Ordered, immutable list of devices.
///
/// Cheap to clone (backed by `Arc`), so it can be handed to every
/// consumer without copying the device list.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    devices: Arc<[Device]>,
}

impl Roster {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: devices.into(),
        }
    }

    /// Devices in roster order.
    pub fn list(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Identifiers that appear more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for d in self.devices.iter() {
            let n = counts.entry(d.id.as_str()).or_insert(0);
            *n += 1;
            if *n == 2 {
                order.push(d.id.clone());
            }
        }
        order
    }

    /// Devices whose address does not parse as IPv4.
    pub fn invalid_addresses(&self) -> Vec<&Device> {
        self.devices.iter().filter(|d| d.ipv4().is_none()).collect()
    }

    /// The plant's printer list as deployed.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_PRINTERS
                .iter()
                .map(|(id, address, location)| Device::new(id, address, location))
                .collect(),
        )
    }
}

impl From<Vec<Device>> for Roster {
    fn from(devices: Vec<Device>) -> Self {
        Self::new(devices)
    }
}

const BUILTIN_PRINTERS: &[(&str, &str, &str)] = &[
    ("PHARI064", "10.10.64.30", "SISTEMAS"),
    ("PHARI019", "10.10.64.66", "RECEPCION GRANOS"),
    ("PHARI030", "10.10.64.16", "RECEPCION GRANOS"),
    ("PHARI029", "10.10.64.21", "OFI PLANTA ALCOHOL"),
    ("PHARI001", "10.10.64.4", "LABORATORIO PLANTA DE ALCOHOL"),
    ("PHARI038", "10.10.64.17", "DESPACHO DE CAMIONES"),
    ("PHARI025", "10.10.64.63", "INGENIERÍA"),
    ("PHARI026", "10.10.64.65", "INGENIERÍA"),
    ("PHARI056", "10.10.64.20", "LABORATORIO ALCOHOL"),
    ("PHARI066", "10.10.64.10", "OFICINA LIDERES DE CALIDAD"),
    ("PHARI014", "10.10.64.15", "OFICINA MANTENIMIENTO"),
    ("PHARI048", "10.10.64.27", "OFICINA DE PROTEINAS"),
    ("PHARI023", "10.10.64.36", "PAÑOL"),
    ("PHARI015", "10.10.64.13", "PRODUCCION - BIO 1"),
    ("PHARI016", "10.10.64.238", "IRIS"),
    ("PHARI064", "10.10.64.202", "SOBREROTULADO"),
    ("PHARI065", "10.10.64.31", "CAPITAL HUMANO"),
    ("PHARI033", "10.10.64.24", "ADMINISTRACIÓN"),
    ("PHARI036", "10.10.64.99", "ADMINISTRACION"),
    ("PHARI017", "10.10.64.8", "ADMINISTRACION"),
    ("PHARI003", "10.10.64.7", "RECEPCION EDIFICIO ADMINISTRACIÓN"),
    ("PHARI008", "10.10.64.5", "MARKETING"),
    ("PHARI002", "10.10.64.18", "LOGÍSTICA DE EXPEDICIÓN"),
    ("PHARI028", "10.10.64.14", "FRACCIONAMIENTO"),
    ("PHARI005", "10.10.64.2", "CALIDAD"),
    ("PHARI011", "10.10.209.7", "ADMINISTRACION"),
    ("PHARI012", "10.10.64.9", "ADMINISTRACIÓN"),
];
