use super::scoped_by_pnp;
use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::{Node, is_real_value};
use crate::record::Attrs;
use crate::source::{Entity, Query};

pub(super) fn disk(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(PhysicalDisk { scope })
}

pub(super) fn cdrom(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Cdrom { scope })
}

/// Fixed and removable disk drives. Scoped to a Plug and Play id when reached
/// through a controller.
struct PhysicalDisk {
    scope: Scope,
}

impl CategoryHandler for PhysicalDisk {
    fn category(&self) -> &'static str {
        "disk"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = scoped_by_pnp(
            Query::new(Entity::DiskDrive).fields(&[
                "Caption",
                "Description",
                "DeviceID",
                "Index",
                "Manufacturer",
                "PNPDeviceID",
                "Size",
            ]),
            &self.scope,
        );
        let records = ctx.query(self.category(), &query)?;

        let mut nodes = Vec::with_capacity(records.len());
        for record in &records {
            let attrs = Attrs::new(self.category(), record);
            let mut node = Node::new("disk", "disk");
            node.description = attrs.text("Description");
            node.product = attrs.text("Caption");
            node.vendor = attrs.text("Manufacturer");
            node.device_id = attrs.text("DeviceID");
            node.pnp_device_id = attrs.text("PNPDeviceID");
            node.size = attrs.uint("Size");
            node.units = "bytes".to_owned();
            node.bus_info = attrs
                .opt_text("Index")
                .map_or_else(|| attrs.text("Index"), |index| format!("scsi@{index}:0.0.0"));

            // Already attached under a controller earlier in this pass.
            if ctx.is_placed(&node) {
                continue;
            }
            if include_children && is_real_value(&node.device_id) {
                node.children = ctx.collect_children(
                    self.category(),
                    &Scope::Device(node.device_id.clone()),
                    true,
                )?;
            }
            nodes.push(node);
        }
        Ok(nodes)
    }
}

/// Optical drives.
struct Cdrom {
    scope: Scope,
}

impl CategoryHandler for Cdrom {
    fn category(&self) -> &'static str {
        "cdrom"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = scoped_by_pnp(
            Query::new(Entity::CdromDrive).fields(&[
                "DeviceID",
                "PNPDeviceID",
                "Manufacturer",
                "Name",
                "Caption",
                "MediaType",
                "Description",
                "MediaLoaded",
                "Drive",
            ]),
            &self.scope,
        );
        let records = ctx.query(self.category(), &query)?;

        Ok(records
            .iter()
            .map(|record| {
                let attrs = Attrs::new(self.category(), record);
                let mut node = Node::new("cdrom", "disk");
                node.description = attrs.text("Description");
                node.product = attrs.text("Name");
                node.vendor = attrs.text("Manufacturer");
                node.logical_name = attrs.text("Drive");
                node.device_id = attrs.text("DeviceID");
                node.pnp_device_id = attrs.text("PNPDeviceID");
                let status = if attrs.flag("MediaLoaded") {
                    "loaded disc"
                } else {
                    "no disc"
                };
                node.set_config("status", status);
                node.set_capability("removable", "support is removable");
                if let Some(media) = attrs.opt_text("MediaType") {
                    node.set_capability("media", media);
                }
                node
            })
            .collect())
    }
}
