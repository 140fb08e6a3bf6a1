use super::scoped_by_pnp;
use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::{Node, UNKNOWN_SENTINEL};
use crate::record::Attrs;
use crate::source::{Entity, Query};

pub(super) fn network(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Network { scope })
}

pub(super) fn video(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Video { scope })
}

pub(super) fn sound(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Sound { scope })
}

/// Physical network adapters, selected by the configured filter.
struct Network {
    scope: Scope,
}

impl CategoryHandler for Network {
    fn category(&self) -> &'static str {
        "network"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::NetworkAdapter)
            .fields(&[
                "AutoSense",
                "Description",
                "DeviceID",
                "MACAddress",
                "Manufacturer",
                "NetConnectionID",
                "PNPDeviceID",
                "Speed",
            ])
            .filter(ctx.config().network_filter.predicate());
        let query = scoped_by_pnp(query, &self.scope);
        let records = ctx.query(self.category(), &query)?;

        Ok(records
            .iter()
            .map(|record| {
                let attrs = Attrs::new(self.category(), record);
                let mut node = Node::new("network", "network");
                node.description = "Ethernet interface".to_owned();
                node.product = attrs.text("Description");
                node.vendor = attrs.text("Manufacturer");
                node.logical_name = attrs.text("NetConnectionID");
                node.serial = attrs.text("MACAddress");
                node.device_id = attrs.opt_text("DeviceID").unwrap_or_default();
                node.pnp_device_id = attrs.text("PNPDeviceID");

                let autonegotiation = attrs.text_or("AutoSense", UNKNOWN_SENTINEL);
                node.set_config("autonegotiation", autonegotiation.as_str());
                if let Some(speed) = attrs.opt_text("Speed") {
                    node.set_config("speed", speed);
                    node.capacity = attrs.uint("Speed");
                    node.size = node.capacity;
                    node.units = "bit/s".to_owned();
                }
                node.set_capability("ethernet", "true");
                node.set_capability("autonegotiation", autonegotiation);
                node
            })
            .collect())
    }
}

struct Video {
    scope: Scope,
}

impl CategoryHandler for Video {
    fn category(&self) -> &'static str {
        "video"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = scoped_by_pnp(
            Query::new(Entity::VideoController).fields(&[
                "AdapterCompatibility",
                "Description",
                "DeviceID",
                "PNPDeviceID",
                "VideoProcessor",
                "AdapterRAM",
            ]),
            &self.scope,
        );
        let records = ctx.query(self.category(), &query)?;

        Ok(records
            .iter()
            .map(|record| {
                let attrs = Attrs::new(self.category(), record);
                let mut node = Node::new("display", "display");
                node.description = attrs.text("Description");
                node.product = attrs.text("VideoProcessor");
                node.vendor = attrs.text("AdapterCompatibility");
                node.device_id = attrs.opt_text("DeviceID").unwrap_or_default();
                node.pnp_device_id = attrs.text("PNPDeviceID");
                node.size = attrs.uint("AdapterRAM");
                if node.size > 0 {
                    node.units = "bytes".to_owned();
                }
                node
            })
            .collect())
    }
}

struct Sound {
    scope: Scope,
}

impl CategoryHandler for Sound {
    fn category(&self) -> &'static str {
        "sound"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = scoped_by_pnp(
            Query::new(Entity::SoundDevice).fields(&[
                "DeviceID",
                "Manufacturer",
                "Name",
                "PNPDeviceID",
            ]),
            &self.scope,
        );
        let records = ctx.query(self.category(), &query)?;

        Ok(records
            .iter()
            .map(|record| {
                let attrs = Attrs::new(self.category(), record);
                let mut node = Node::new("multimedia", "multimedia");
                node.description = "Audio device".to_owned();
                node.product = attrs.text("Name");
                node.vendor = attrs.text("Manufacturer");
                node.device_id = attrs.opt_text("DeviceID").unwrap_or_default();
                node.pnp_device_id = attrs.text("PNPDeviceID");
                node
            })
            .collect())
    }
}
