use super::scoped_by_pnp;
use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::{Node, is_real_value};
use crate::record::Attrs;
use crate::resolver::{AssociationPair, dependents_of};
use crate::source::{Entity, Predicate, Query, Record};

pub(super) fn controllers(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(UsbControllers { scope })
}

pub(super) fn devices(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(UsbDevices { scope })
}

/// Host controllers (`usb:N`), each owning the devices attached to it.
struct UsbControllers {
    scope: Scope,
}

impl CategoryHandler for UsbControllers {
    fn category(&self) -> &'static str {
        "usb"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = scoped_by_pnp(
            Query::new(Entity::UsbController).fields(&[
                "Caption",
                "Description",
                "DeviceID",
                "Manufacturer",
                "PNPDeviceID",
            ]),
            &self.scope,
        );
        let records = ctx.query(self.category(), &query)?;

        let mut nodes = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let attrs = Attrs::new(self.category(), record);
            let mut node = Node::new(format!("usb:{index}"), "bus");
            node.description = attrs.text("Description");
            node.product = attrs.text("Caption");
            node.vendor = attrs.text("Manufacturer");
            node.device_id = attrs.opt_text("DeviceID").unwrap_or_default();
            node.pnp_device_id = attrs.text("PNPDeviceID");
            if include_children && is_real_value(&node.pnp_device_id) {
                node.children = ctx.collect_children(
                    self.category(),
                    &Scope::Device(node.pnp_device_id.clone()),
                    true,
                )?;
            }
            nodes.push(node);
        }
        Ok(nodes)
    }
}

/// Devices attached to USB controllers. Scoped to one controller when
/// reached from [`UsbControllers`]; otherwise every controller seen in the
/// association rows.
struct UsbDevices {
    scope: Scope,
}

impl UsbDevices {
    fn lookup_device(ctx: &CollectCtx<'_>, pnp_id: &str) -> Option<Record> {
        let query = Query::new(Entity::PnpEntity)
            .fields(&[
                "Caption",
                "Description",
                "DeviceID",
                "Manufacturer",
                "PNPDeviceID",
            ])
            .filter(Predicate::eq("PNPDeviceID", pnp_id));
        match ctx.query("usbdevices", &query) {
            Ok(records) => records.into_iter().next(),
            Err(err) => {
                tracing::warn!(device = pnp_id, error = %err, "USB device lookup failed");
                None
            }
        }
    }
}

impl CategoryHandler for UsbDevices {
    fn category(&self) -> &'static str {
        "usbdevices"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let rows = ctx.associations(self.category(), Entity::UsbControllerDevice)?;
        let pairs = AssociationPair::parse_all(self.category(), &rows);

        let controllers: Vec<&str> = match self.scope.device() {
            Some(controller) => vec![controller],
            None => {
                let mut seen: Vec<&str> = Vec::new();
                for pair in &pairs {
                    let value = pair.antecedent.value.as_str();
                    if !seen.iter().any(|s| s.eq_ignore_ascii_case(value)) {
                        seen.push(value);
                    }
                }
                seen
            }
        };

        let usb = &ctx.config().usb;
        let mut nodes = Vec::new();
        for controller in controllers {
            for dependent in dependents_of(&pairs, controller) {
                let Some(record) = Self::lookup_device(ctx, dependent) else {
                    continue;
                };
                let attrs = Attrs::new(self.category(), &record);
                let caption = attrs.text("Caption");
                if usb.is_excluded(&caption) {
                    tracing::debug!(device = dependent, %caption, "Excluded USB device");
                    continue;
                }
                let description = attrs.opt_text("Description");
                let mut node = Node::new(usb.id_for(description.as_deref()), "usb");
                if let Some(description) = description {
                    node.description = description;
                }
                node.product = caption;
                node.vendor = attrs.text("Manufacturer");
                node.device_id = attrs.opt_text("DeviceID").unwrap_or_default();
                node.pnp_device_id = attrs.text_or("PNPDeviceID", dependent);
                node.parent_pnp_device_id = controller.to_owned();
                nodes.push(node);
            }
        }
        Ok(nodes)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::InventoryConfig;
    use crate::error::DataAccessError;
    use crate::registry::CategoryRegistry;
    use crate::source::{AssociationRecord, SnapshotSource};
    use serde_json::json;
    use tracing_test::traced_test;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn attached(controller: &str, device: &str) -> AssociationRecord {
        AssociationRecord::new(
            format!(r#"\\H\root\cimv2:Win32_USBController.DeviceID="{controller}""#),
            format!(r#"\\H\root\cimv2:Win32_PnPEntity.DeviceID="{device}""#),
        )
    }

    fn usb_source() -> SnapshotSource {
        SnapshotSource::new()
            .with_records(
                Entity::UsbController,
                [
                    record(json!({"PNPDeviceID": "PCI\\XHCI", "Description": "USB xHCI Compliant Host Controller"})),
                    record(json!({"PNPDeviceID": "PCI\\EHCI", "Description": "Standard Enhanced PCI to USB Host Controller"})),
                ],
            )
            .with_associations(
                Entity::UsbControllerDevice,
                [
                    attached("PCI\\\\XHCI", "USB\\\\ROOT_HUB30"),
                    attached("PCI\\\\XHCI", "HID\\\\MOUSE"),
                    attached("PCI\\\\EHCI", "USBSTOR\\\\DISK"),
                ],
            )
            .with_records(
                Entity::PnpEntity,
                [
                    record(json!({"PNPDeviceID": "USB\\ROOT_HUB30", "Caption": "USB Root Hub", "Description": "USB Root Hub"})),
                    record(json!({
                        "PNPDeviceID": "HID\\MOUSE",
                        "Caption": "HID-compliant mouse",
                        "Description": "HID-compliant mouse",
                        "Manufacturer": "Microsoft",
                    })),
                    record(json!({"PNPDeviceID": "USBSTOR\\DISK", "Caption": "Kingston DataTraveler", "Description": "Disk drive"})),
                ],
            )
    }

    fn run(handler: &dyn CategoryHandler, source: &SnapshotSource) -> Vec<Node> {
        let registry = CategoryRegistry::builtin().unwrap();
        let config = InventoryConfig::default();
        let mut ctx = CollectCtx::new(source, &registry, &config);
        handler.collect(&mut ctx, true).unwrap()
    }

    #[test]
    fn controllers_own_their_devices() {
        let source = usb_source();
        let nodes = run(&UsbControllers { scope: Scope::All }, &source);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "usb:0");
        assert_eq!(nodes[0].category, "bus");
        assert_eq!(nodes[1].id, "usb:1");

        let xhci: Vec<_> = nodes[0].children.iter().map(|n| n.product.as_str()).collect();
        assert_eq!(xhci, ["HID-compliant mouse"]);
        assert_eq!(nodes[0].children[0].id, "usb_mouse");
        assert_eq!(nodes[0].children[0].parent_pnp_device_id, r"PCI\XHCI");

        assert_eq!(nodes[1].children.len(), 1);
        assert_eq!(nodes[1].children[0].id, "usb_disk");
        assert_eq!(nodes[1].children[0].vendor, crate::model::ERROR_SENTINEL);
    }

    #[test]
    fn unscoped_devices_cover_every_controller() {
        let source = usb_source();
        let nodes = run(&UsbDevices { scope: Scope::All }, &source);
        let pnp: Vec<_> = nodes.iter().map(|n| n.pnp_device_id.as_str()).collect();
        assert_eq!(pnp, [r"HID\MOUSE", r"USBSTOR\DISK"]);
    }

    #[test]
    #[traced_test]
    fn failed_device_lookup_skips_that_device() {
        let source = usb_source().fail(Entity::PnpEntity, DataAccessError::Unavailable("rpc".to_owned()));
        let nodes = run(&UsbDevices { scope: Scope::All }, &source);
        assert!(nodes.is_empty());
        assert!(logs_contain("USB device lookup failed"));
    }

    #[test]
    fn empty_sources_give_empty_lists() {
        let source = SnapshotSource::new();
        assert!(run(&UsbControllers { scope: Scope::All }, &source).is_empty());
        assert!(run(&UsbDevices { scope: Scope::All }, &source).is_empty());
    }
}
