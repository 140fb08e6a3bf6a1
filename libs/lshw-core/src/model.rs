use std::collections::BTreeMap;

use serde::Serialize;

/// Placeholder for an attribute that was requested but could not be read.
pub const ERROR_SENTINEL: &str = "Error getting data";

/// Placeholder for a value that was not requested or does not apply.
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// One hardware component in the report, owning its children.
///
/// Serializes with `category` under the `class` key. Optional fields left
/// empty or zero are omitted entirely rather than emitted as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "class")]
    pub category: String,
    pub claimed: bool,
    pub handle: String,
    pub description: String,
    pub product: String,
    pub vendor: String,
    #[serde(rename = "physid")]
    pub physical_id: String,
    pub serial: String,
    pub children: Vec<Node>,

    #[serde(rename = "businfo", skip_serializing_if = "String::is_empty")]
    pub bus_info: String,
    #[serde(rename = "logicalname", skip_serializing_if = "String::is_empty")]
    pub logical_name: String,
    #[serde(rename = "deviceid", skip_serializing_if = "String::is_empty")]
    pub device_id: String,
    #[serde(rename = "pnpdeviceid", skip_serializing_if = "String::is_empty")]
    pub pnp_device_id: String,
    #[serde(rename = "parent_pnpdeviceid", skip_serializing_if = "String::is_empty")]
    pub parent_pnp_device_id: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub width: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub size: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub clock: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub capacity: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub units: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slot: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub capabilities: BTreeMap<String, String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl Node {
    /// Fresh node with the descriptive fields set to [`ERROR_SENTINEL`].
    #[must_use]
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            claimed: true,
            handle: String::new(),
            description: ERROR_SENTINEL.to_owned(),
            product: ERROR_SENTINEL.to_owned(),
            vendor: ERROR_SENTINEL.to_owned(),
            physical_id: ERROR_SENTINEL.to_owned(),
            serial: ERROR_SENTINEL.to_owned(),
            children: Vec::new(),
            bus_info: String::new(),
            logical_name: String::new(),
            device_id: String::new(),
            pnp_device_id: String::new(),
            parent_pnp_device_id: String::new(),
            width: 0,
            size: 0,
            clock: 0,
            capacity: 0,
            units: String::new(),
            date: String::new(),
            version: String::new(),
            slot: String::new(),
            configuration: BTreeMap::new(),
            capabilities: BTreeMap::new(),
        }
    }

    /// Key identifying the physical device behind this node, if it has one.
    ///
    /// The Plug and Play identifier wins over the device identifier; sentinel values
    /// never identify anything.
    #[must_use]
    pub fn placement_key(&self) -> Option<String> {
        [&self.pnp_device_id, &self.device_id]
            .into_iter()
            .find(|id| is_real_value(id))
            .map(|id| format!("{}|{}", self.category, id.to_ascii_uppercase()))
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Depth-first pre-order walk over this subtree.
    pub fn walk(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn set_config(&mut self, key: &str, value: impl Into<String>) {
        self.configuration.insert(key.to_owned(), value.into());
    }

    pub fn set_capability(&mut self, key: &str, value: impl Into<String>) {
        self.capabilities.insert(key.to_owned(), value.into());
    }
}

/// True for values that carry data: non-empty and not a sentinel.
#[must_use]
pub fn is_real_value(value: &str) -> bool {
    !value.is_empty() && value != ERROR_SENTINEL && value != UNKNOWN_SENTINEL
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_optional_fields_are_not_serialized() {
        let node = Node::new("cpu:0", "processor");
        let json = serde_json::to_value(&node).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["class"], "processor");
        assert_eq!(obj["vendor"], ERROR_SENTINEL);
        assert!(obj.contains_key("children"));
        for key in [
            "businfo",
            "logicalname",
            "deviceid",
            "pnpdeviceid",
            "parent_pnpdeviceid",
            "width",
            "size",
            "clock",
            "capacity",
            "units",
            "date",
            "version",
            "slot",
            "configuration",
            "capabilities",
        ] {
            assert!(!obj.contains_key(key), "{key} should be omitted");
        }
        assert!(!obj.values().any(serde_json::Value::is_null));
    }

    #[test]
    fn explicitly_set_optional_fields_are_serialized() {
        let mut node = Node::new("disk", "disk");
        node.size = 1_000_000_000;
        node.bus_info = "scsi@0:0.0.0".to_owned();
        node.set_config("signature", "abc");

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["size"], 1_000_000_000_u64);
        assert_eq!(json["businfo"], "scsi@0:0.0.0");
        assert_eq!(json["configuration"]["signature"], "abc");
    }

    #[test]
    fn placement_key_prefers_pnp_id_and_ignores_sentinels() {
        let mut node = Node::new("disk", "disk");
        assert_eq!(node.placement_key(), None);

        node.device_id = ERROR_SENTINEL.to_owned();
        assert_eq!(node.placement_key(), None);

        node.device_id = r"\\.\PHYSICALDRIVE0".to_owned();
        assert_eq!(
            node.placement_key().as_deref(),
            Some(r"disk|\\.\PHYSICALDRIVE0")
        );

        node.pnp_device_id = r"ide\disk_vbox\4&29d9344&0&0.0.0".to_owned();
        assert_eq!(
            node.placement_key().as_deref(),
            Some(r"disk|IDE\DISK_VBOX\4&29D9344&0&0.0.0")
        );
    }

    #[test]
    fn walk_visits_in_pre_order() {
        let mut root = Node::new("root", "system");
        let mut board = Node::new("core", "bus");
        board.children.push(Node::new("cpu:0", "processor"));
        root.children.push(board);
        root.children.push(Node::new("pci", "bridge"));

        let ids: Vec<_> = root.walk().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "core", "cpu:0", "pci"]);
        assert_eq!(root.count(), 4);
    }
}
