use super::lookup_or_empty;
use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::Node;
use crate::record::Attrs;
use crate::source::{Entity, Query};

const CATEGORY: &str = "pci";

pub(super) fn factory(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(HostBridge)
}

/// `pci` host bridge. Its own records are the system buses; devices on the
/// bus come from the registered child categories.
struct HostBridge;

/// `PCI_BUS_0` -> `pci:0`, `ISA_BUS_0` -> `isa:0`, `PNP_BUS_0` -> `pnp:0`.
fn bus_id(device_id: &str) -> String {
    let kind = device_id
        .get(..3)
        .map(str::to_ascii_lowercase)
        .filter(|kind| matches!(kind.as_str(), "pci" | "isa" | "pnp"))
        .unwrap_or_else(|| "bus".to_owned());
    let index = device_id.chars().last().map(String::from).unwrap_or_default();
    format!("{kind}:{index}")
}

impl CategoryHandler for HostBridge {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::Bus).fields(&["Caption", "Description", "DeviceID"]);
        let records = lookup_or_empty(ctx, CATEGORY, &query)?;

        let mut children: Vec<Node> = records
            .iter()
            .map(|record| {
                let attrs = Attrs::new(CATEGORY, record);
                let device_id = attrs.text_or("DeviceID", "Host bridge");
                let mut node = Node::new(bus_id(&device_id), "bridge");
                node.product = attrs.text_or("Caption", "");
                node.description = device_id;
                node
            })
            .collect();
        if include_children {
            children.extend(ctx.collect_children(CATEGORY, &Scope::All, true)?);
        }
        if children.is_empty() {
            return Ok(Vec::new());
        }

        let mut bridge = Node::new("pci", "bridge");
        bridge.description = "Host bridge".to_owned();
        bridge.children = children;
        Ok(vec![bridge])
    }
}
