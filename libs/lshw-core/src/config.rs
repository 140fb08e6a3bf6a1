use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::source::Predicate;

/// Tunables of the engine that vary between Windows builds and locales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryConfig {
    /// Antecedent value prefix that marks a primary controller in
    /// controller association chains.
    #[serde(default = "default_controller_bus_prefix")]
    pub controller_bus_prefix: String,
    #[serde(default)]
    pub network_filter: NetworkFilter,
    #[serde(default)]
    pub usb: UsbConfig,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            controller_bus_prefix: default_controller_bus_prefix(),
            network_filter: NetworkFilter::default(),
            usb: UsbConfig::default(),
        }
    }
}

fn default_controller_bus_prefix() -> String {
    r"PCI\".to_owned()
}

/// How physical network adapters are told apart from virtual ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkFilter {
    /// `PhysicalAdapter = TRUE` (Vista and later).
    #[default]
    PhysicalAdapter,
    /// Exclude software adapters enumerated under `ROOT\` (older builds
    /// lack the `PhysicalAdapter` attribute).
    NonRootPnp,
}

impl NetworkFilter {
    #[must_use]
    pub fn predicate(self) -> Predicate {
        match self {
            Self::PhysicalAdapter => Predicate::IsTrue("PhysicalAdapter"),
            Self::NonRootPnp => Predicate::contains("PNPDeviceID", "ROOT").negate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsbConfig {
    /// Device captions left out of the USB listing (hubs, composite parents).
    #[serde(default = "default_excluded_captions")]
    pub excluded_captions: Vec<String>,
    /// Node id to use for a device, keyed by its exact description.
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            excluded_captions: default_excluded_captions(),
            aliases: default_aliases(),
        }
    }
}

impl UsbConfig {
    #[must_use]
    pub fn is_excluded(&self, caption: &str) -> bool {
        self.excluded_captions.iter().any(|c| c == caption)
    }

    /// Node id for a device description, `usb_device` when unaliased.
    #[must_use]
    pub fn id_for(&self, description: Option<&str>) -> String {
        description
            .and_then(|d| self.aliases.get(d))
            .map_or_else(|| "usb_device".to_owned(), Clone::clone)
    }
}

fn default_excluded_captions() -> Vec<String> {
    [
        "Dispositivo compuesto USB",
        "Dispositivo de interfaz humana USB",
        "Dispositivo de almacenamiento masivo USB",
        "USB 2.0 Root Hub",
        "USB Composite Device",
        "USB Input Device",
        "USB Mass Storage Device",
        "USB Root Hub",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_aliases() -> BTreeMap<String, String> {
    [
        ("Mouse compatible con HID", "usb_mouse"),
        ("Dispositivo de teclado HID", "usb_teclado"),
        ("SmartBoard XX44", "usb_smartboard_xx44"),
        ("Unidad de disco", "usb_disk"),
        ("Volumen gen\u{e9}rico", "usb_vol"),
        ("HID-compliant mouse", "usb_mouse"),
        ("HID Keyboard Device", "usb_keyboard"),
        ("Disk drive", "usb_disk"),
        ("Generic volume", "usb_vol"),
    ]
    .into_iter()
    .map(|(description, id)| (description.to_owned(), id.to_owned()))
    .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_desktop_builds() {
        let config = InventoryConfig::default();
        assert_eq!(config.controller_bus_prefix, r"PCI\");
        assert_eq!(config.network_filter, NetworkFilter::PhysicalAdapter);
        assert!(config.usb.is_excluded("USB 2.0 Root Hub"));
        assert!(!config.usb.is_excluded("SmartBoard XX44"));
    }

    #[test]
    fn usb_aliases_fall_back_to_generic_id() {
        let usb = UsbConfig::default();
        assert_eq!(usb.id_for(Some("Mouse compatible con HID")), "usb_mouse");
        assert_eq!(usb.id_for(Some("Volumen gen\u{e9}rico")), "usb_vol");
        assert_eq!(usb.id_for(Some("Webcam")), "usb_device");
        assert_eq!(usb.id_for(None), "usb_device");
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let config: InventoryConfig =
            serde_json::from_str(r#"{"network_filter": "non_root_pnp"}"#).unwrap();
        assert_eq!(config.network_filter, NetworkFilter::NonRootPnp);
        assert_eq!(config.controller_bus_prefix, r"PCI\");
        assert!(!config.usb.aliases.is_empty());

        let err = serde_json::from_str::<InventoryConfig>(r#"{"bogus": 1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn network_filter_renders_expected_predicates() {
        assert_eq!(
            NetworkFilter::PhysicalAdapter.predicate().to_string(),
            "PhysicalAdapter = TRUE"
        );
        assert_eq!(
            NetworkFilter::NonRootPnp.predicate().to_string(),
            r#"NOT (PNPDeviceID LIKE "%ROOT%")"#
        );
    }
}
