use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::Node;
use crate::record::Attrs;
use crate::source::{Entity, Query};

const CATEGORY: &str = "processor";

pub(super) fn factory(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Processor)
}

struct Processor;

impl CategoryHandler for Processor {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::Processor).fields(&[
            "Manufacturer",
            "Name",
            "Description",
            "SocketDesignation",
            "DataWidth",
            "MaxClockSpeed",
        ]);
        let records = ctx.query(CATEGORY, &query)?;

        // Ids follow source order.
        Ok(records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let attrs = Attrs::new(CATEGORY, record);
                let mut node = Node::new(format!("cpu:{i}"), CATEGORY);
                node.description = attrs.text("Description");
                node.product = attrs.text("Name");
                node.vendor = attrs.text("Manufacturer");
                node.bus_info = format!("cpu@{i}");
                node.slot = attrs.text("SocketDesignation");
                node.width = attrs.uint("DataWidth");
                node.clock = attrs.uint("MaxClockSpeed");
                node.units = "MHz".to_owned();
                node
            })
            .collect())
    }
}
