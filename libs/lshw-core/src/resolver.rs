//! Controller-chain resolution over antecedent/dependent association rows.
//!
//! A chain is a fixed two-level shape: a primary controller on the bus, its
//! secondary channels, and the leaf drives attached to either. Deeper nesting
//! is not followed.

use crate::error::InventoryError;
use crate::handler::{CollectCtx, Scope};
use crate::model::Node;
use crate::record::Attrs;
use crate::source::{AssociationRecord, Entity, Predicate, Query, Record};

/// Object path `namespace:class="value"` split into its parts, with quotes
/// stripped and doubled path separators collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePath {
    pub namespace: String,
    pub class: String,
    pub value: String,
}

impl DevicePath {
    /// Returns `None` when there is no `=` separating key and value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (key, value) = raw.split_once('=')?;
        let (namespace, class) = key.split_once(':').unwrap_or(("", key));
        Some(Self {
            namespace: namespace.trim().to_owned(),
            class: class.trim().to_owned(),
            value: value.trim().replace('"', "").replace(r"\\", r"\"),
        })
    }

    /// Trailing identifier segment of the value: the last `&` token of the
    /// last `\` component (`PCIIDE\IDECHANNEL\4&2617AEAE&0&1` gives `1`).
    #[must_use]
    pub fn trailing_segment(&self) -> &str {
        trailing_segment(&self.value)
    }
}

fn trailing_segment(value: &str) -> &str {
    value
        .rsplit('\\')
        .next()
        .and_then(|component| component.rsplit('&').next())
        .unwrap_or(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationPair {
    pub antecedent: DevicePath,
    pub dependent: DevicePath,
}

impl AssociationPair {
    #[must_use]
    pub fn parse(row: &AssociationRecord) -> Option<Self> {
        Some(Self {
            antecedent: DevicePath::parse(&row.antecedent)?,
            dependent: DevicePath::parse(&row.dependent)?,
        })
    }

    /// Parse every row, logging and dropping the malformed ones.
    #[must_use]
    pub fn parse_all(category: &str, rows: &[AssociationRecord]) -> Vec<Self> {
        rows.iter()
            .filter_map(|row| {
                let pair = Self::parse(row);
                if pair.is_none() {
                    tracing::warn!(
                        category,
                        antecedent = %row.antecedent,
                        dependent = %row.dependent,
                        "Skipping malformed association row"
                    );
                }
                pair
            })
            .collect()
    }
}

/// Dependent values of every pair whose antecedent is `antecedent`.
#[must_use]
pub fn dependents_of<'p>(
    pairs: &'p [AssociationPair],
    antecedent: &'p str,
) -> impl Iterator<Item = &'p str> + 'p {
    pairs
        .iter()
        .filter(move |pair| pair.antecedent.value.eq_ignore_ascii_case(antecedent))
        .map(|pair| pair.dependent.value.as_str())
}

/// Antecedent values that start with `prefix`, deduplicated in first-seen
/// order.
#[must_use]
pub fn primary_roots<'p>(pairs: &'p [AssociationPair], prefix: &str) -> Vec<&'p str> {
    let mut roots: Vec<&str> = Vec::new();
    for pair in pairs {
        let value = pair.antecedent.value.as_str();
        let is_bus = value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if is_bus && !roots.iter().any(|seen| seen.eq_ignore_ascii_case(value)) {
            roots.push(value);
        }
    }
    roots
}

const CONTROLLER_FIELDS: &[&str] = &[
    "Manufacturer",
    "Caption",
    "Description",
    "DeviceID",
    "PNPDeviceID",
];

/// One controller family: which association rows to read, which entity
/// holds the controller records, and the registry category whose children
/// describe the attached drives.
#[derive(Debug, Clone, Copy)]
pub struct ControllerChain {
    pub category: &'static str,
    pub association: Entity,
    pub controller: Entity,
    pub id_prefix: &'static str,
}

impl ControllerChain {
    pub const IDE: Self = Self {
        category: "ide",
        association: Entity::IdeControllerDevice,
        controller: Entity::IdeController,
        id_prefix: "controller",
    };

    pub const SCSI: Self = Self {
        category: "scsi",
        association: Entity::ScsiControllerDevice,
        controller: Entity::ScsiController,
        id_prefix: "scsi",
    };

    /// Build one node per primary controller, with channels and drives.
    ///
    /// Failing lookups for a single controller, channel or drive are logged
    /// and that branch is skipped.
    ///
    /// # Errors
    /// Failure to read the association rows themselves, or a
    /// non-recoverable error from a drive category.
    pub fn resolve(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let rows = ctx.associations(self.category, self.association)?;
        let pairs = AssociationPair::parse_all(self.category, &rows);
        let prefix = ctx.config().controller_bus_prefix.as_str();

        let mut nodes = Vec::new();
        for root in primary_roots(&pairs, prefix) {
            let Some(record) = self.lookup_controller(ctx, root) else {
                continue;
            };
            let id = format!("{}:{}", self.id_prefix, nodes.len());
            let mut primary = controller_node(id, self.category, &record);

            for dependent in dependents_of(&pairs, root) {
                match self.lookup_controller(ctx, dependent) {
                    Some(record) => {
                        let id = format!("channel:{}", trailing_segment(dependent));
                        let mut channel = controller_node(id, self.category, &record);
                        if include_children {
                            // Second level: only drives, never further controllers.
                            for leaf in dependents_of(&pairs, dependent) {
                                channel.children.extend(self.resolve_leaf(ctx, leaf)?);
                            }
                        }
                        primary.children.push(channel);
                    }
                    None if include_children => {
                        primary.children.extend(self.resolve_leaf(ctx, dependent)?);
                    }
                    None => {}
                }
            }
            nodes.push(primary);
        }
        Ok(nodes)
    }

    /// Controller record for `pnp_id`; absent or unreadable yields `None`.
    fn lookup_controller(&self, ctx: &CollectCtx<'_>, pnp_id: &str) -> Option<Record> {
        let query = Query::new(self.controller)
            .fields(CONTROLLER_FIELDS)
            .filter(Predicate::eq("PNPDeviceID", pnp_id));
        match ctx.query(self.category, &query) {
            Ok(records) => records.into_iter().next(),
            Err(err) => {
                tracing::warn!(
                    category = self.category,
                    device = pnp_id,
                    error = %err,
                    "Controller lookup failed"
                );
                None
            }
        }
    }

    /// Drives for a non-controller dependent: the first child category of
    /// the chain (disk, then cdrom) that yields nodes wins.
    fn resolve_leaf(
        &self,
        ctx: &mut CollectCtx<'_>,
        pnp_id: &str,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::PnpEntity)
            .fields(&["PNPDeviceID"])
            .filter(Predicate::eq("PNPDeviceID", pnp_id));
        match ctx.query(self.category, &query) {
            Ok(records) if records.is_empty() => {
                tracing::debug!(
                    category = self.category,
                    device = pnp_id,
                    "Dependent is not a device"
                );
                return Ok(Vec::new());
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    category = self.category,
                    device = pnp_id,
                    error = %err,
                    "Device lookup failed"
                );
                return Ok(Vec::new());
            }
        }

        let registry = ctx.registry();
        for child in registry.children_of(self.category) {
            let nodes = ctx.collect_category(child, Scope::Device(pnp_id.to_owned()), true)?;
            if !nodes.is_empty() {
                return Ok(nodes);
            }
        }
        tracing::debug!(category = self.category, device = pnp_id, "Dependent is not a drive");
        Ok(Vec::new())
    }
}

fn controller_node(id: String, category: &'static str, record: &Record) -> Node {
    let attrs = Attrs::new(category, record);
    let mut node = Node::new(id, "storage");
    node.description = attrs.text("Description");
    node.product = attrs.text("Caption");
    node.vendor = attrs.text("Manufacturer");
    node.device_id = attrs.opt_text("DeviceID").unwrap_or_default();
    node.pnp_device_id = attrs.text("PNPDeviceID");
    node
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn row(antecedent: &str, dependent: &str) -> AssociationRecord {
        AssociationRecord::new(antecedent, dependent)
    }

    #[test]
    fn parses_object_paths() {
        let path = DevicePath::parse(
            r#"\\HOST\root\cimv2:Win32_IDEController.DeviceID="PCI\\VEN_8086&DEV_7111\\3&267A616A&0&09""#,
        )
        .unwrap();
        assert_eq!(path.namespace, r"\\HOST\root\cimv2");
        assert_eq!(path.class, "Win32_IDEController.DeviceID");
        assert_eq!(path.value, r"PCI\VEN_8086&DEV_7111\3&267A616A&0&09");
        assert_eq!(path.trailing_segment(), "09");

        let bare = DevicePath::parse(r#"DeviceID="IDE\\DISK""#).unwrap();
        assert_eq!(bare.namespace, "");
        assert_eq!(bare.value, r"IDE\DISK");

        assert!(DevicePath::parse("no separator").is_none());
    }

    #[test]
    fn primary_roots_are_deduplicated_in_order() {
        let pairs = AssociationPair::parse_all(
            "ide",
            &[
                row(r#"a:b="PCI\\B""#, r#"a:b="X""#),
                row(r#"a:b="PCI\\A""#, r#"a:b="Y""#),
                row(r#"a:b="pci\\b""#, r#"a:b="Z""#),
                row(r#"a:b="PCIIDE\\C""#, r#"a:b="W""#),
                row("garbage", "rows"),
            ],
        );
        assert_eq!(pairs.len(), 4);
        assert_eq!(primary_roots(&pairs, r"PCI\"), [r"PCI\B", r"PCI\A"]);
        assert_eq!(dependents_of(&pairs, r"PCI\B").collect::<Vec<_>>(), ["X", "Z"]);
    }
}
