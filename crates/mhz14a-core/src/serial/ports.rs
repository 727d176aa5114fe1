//! Serial port discovery
//!
//! Lists candidate devices for the sensor. On-board UARTs (where an MH-Z14A
//! is usually wired on single-board computers) sort before USB adapters.

use serialport::{SerialPortInfo, SerialPortType};
use std::collections::HashMap;
#[cfg(target_os = "linux")]
use std::fs;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path (e.g., "/dev/ttyS0" or "/dev/ttyUSB0")
    pub name: String,

    /// USB product name, when the port is a USB adapter
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let product = match info.port_type {
            SerialPortType::UsbPort(usb_info) => usb_info.product,
            _ => None,
        };
        Self {
            name: info.port_name,
            product,
        }
    }
}

/// Device name prefixes in listing order
const PREFIX_ORDER: &[&str] = &["serial", "ttyAMA", "ttyS", "ttyUSB"];

/// Sort key: known prefix rank, numeric suffix, then basename
fn port_sort_key(name: &str) -> (usize, usize, String) {
    let basename = name.rsplit('/').next().unwrap_or(name);
    for (rank, prefix) in PREFIX_ORDER.iter().enumerate() {
        if let Some(rest) = basename.strip_prefix(prefix) {
            if let Ok(num) = rest.parse::<usize>() {
                return (rank, num, basename.to_string());
            }
        }
    }
    (PREFIX_ORDER.len(), 0, basename.to_string())
}

/// Merge enumerated ports with `/dev` entry names
///
/// Enumerated entries win over fallbacks for the same path, so USB product
/// names survive. Fallback names without a known prefix and numeric suffix
/// are ignored.
fn merge_ports<I, S>(enumerated: Vec<PortInfo>, dev_entries: I) -> Vec<PortInfo>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map: HashMap<String, PortInfo> = HashMap::new();
    for p in enumerated {
        map.entry(p.name.clone()).or_insert(p);
    }
    for fname in dev_entries {
        let fname = fname.as_ref();
        if port_sort_key(fname).0 < PREFIX_ORDER.len() {
            let full = format!("/dev/{}", fname);
            map.entry(full.clone()).or_insert_with(|| PortInfo {
                name: full,
                product: None,
            });
        }
    }

    let mut v: Vec<PortInfo> = map.into_values().collect();
    v.sort_by_key(|p| port_sort_key(&p.name));
    v
}

/// List available serial ports with /dev fallbacks and deterministic ordering
pub fn list_ports() -> Vec<PortInfo> {
    let enumerated = match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(PortInfo::from).collect(),
        Err(e) => {
            tracing::warn!("port enumeration failed: {}", e);
            Vec::new()
        }
    };

    #[allow(unused_mut)]
    let mut dev_entries: Vec<String> = Vec::new();
    #[cfg(target_os = "linux")]
    if let Ok(entries) = fs::read_dir("/dev") {
        dev_entries.extend(
            entries
                .flatten()
                .filter_map(|entry| entry.file_name().to_str().map(str::to_string)),
        );
    }

    merge_ports(enumerated, dev_entries)
}
