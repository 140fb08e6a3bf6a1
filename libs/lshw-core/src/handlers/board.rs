use super::lookup_or_empty;
use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::Node;
use crate::record::Attrs;
use crate::source::{Entity, Query};

pub(super) fn base_board(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(BaseBoard)
}

pub(super) fn bios(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Bios)
}

/// Motherboard. Always produces its node so that memory, processors and
/// buses have somewhere to hang even if the board record is unreadable.
struct BaseBoard;

impl CategoryHandler for BaseBoard {
    fn category(&self) -> &'static str {
        "baseboard"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query =
            Query::new(Entity::BaseBoard).fields(&["Model", "SerialNumber", "Manufacturer", "Product"]);
        let records = lookup_or_empty(ctx, self.category(), &query)?;

        let mut node = Node::new("core", "bus");
        node.description = "Motherboard".to_owned();
        node.physical_id = "0".to_owned();
        if let Some(record) = records.first() {
            let attrs = Attrs::new(self.category(), record);
            node.product = attrs.text("Product");
            node.vendor = attrs.text("Manufacturer");
            node.serial = attrs.text("SerialNumber");
        }

        if include_children {
            node.children = ctx.collect_children(self.category(), &Scope::All, true)?;
        }
        Ok(vec![node])
    }
}

/// Firmware image.
struct Bios;

impl CategoryHandler for Bios {
    fn category(&self) -> &'static str {
        "bios"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::Bios).fields(&[
            "Name",
            "Manufacturer",
            "BIOSVersion",
            "ReleaseDate",
            "SerialNumber",
        ]);
        let records = ctx.query(self.category(), &query)?;

        Ok(records
            .iter()
            .map(|record| {
                let attrs = Attrs::new(self.category(), record);
                let mut node = Node::new("firmware", "memory");
                node.description = "BIOS".to_owned();
                node.product = attrs.text_or("Name", "BIOS");
                node.vendor = attrs.text("Manufacturer");
                node.serial = attrs.text("SerialNumber");
                node.date = attrs.text("ReleaseDate");
                node.version = attrs
                    .first_text("BIOSVersion")
                    .unwrap_or_else(|| attrs.text("BIOSVersion"));
                node
            })
            .collect())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::InventoryConfig;
    use crate::error::DataAccessError;
    use crate::model::ERROR_SENTINEL;
    use crate::registry::CategoryRegistry;
    use crate::source::{Record, SnapshotSource};
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn run(handler: &dyn CategoryHandler, source: &SnapshotSource, children: bool) -> Vec<Node> {
        let registry = CategoryRegistry::builtin().unwrap();
        let config = InventoryConfig::default();
        let mut ctx = CollectCtx::new(source, &registry, &config);
        handler.collect(&mut ctx, children).unwrap()
    }

    #[test]
    fn board_maps_product_vendor_serial() {
        let source = SnapshotSource::new().with_records(
            Entity::BaseBoard,
            [record(json!({"Product": "0MK8WX", "Manufacturer": "Dell Inc.", "SerialNumber": "/7XK2/"}))],
        );
        let nodes = run(&BaseBoard, &source, false);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "core");
        assert_eq!(nodes[0].category, "bus");
        assert_eq!(nodes[0].physical_id, "0");
        assert_eq!(nodes[0].product, "0MK8WX");
        assert_eq!(nodes[0].serial, "/7XK2/");
    }

    #[test]
    fn unreadable_board_keeps_placeholders_and_children() {
        let source = SnapshotSource::new()
            .fail(Entity::BaseBoard, DataAccessError::Unavailable("rpc server".to_owned()))
            .with_records(Entity::Processor, [record(json!({"Name": "Core i5"}))]);
        let nodes = run(&BaseBoard, &source, true);
        assert_eq!(nodes[0].vendor, ERROR_SENTINEL);
        assert!(nodes[0].children.iter().any(|child| child.id == "cpu:0"));
    }

    #[test]
    fn bios_takes_first_version_entry() {
        let source = SnapshotSource::new().with_records(
            Entity::Bios,
            [record(json!({
                "Manufacturer": "Dell Inc.",
                "BIOSVersion": ["DELL   - 1072009", "A29"],
                "ReleaseDate": "20180611000000.000000+000",
            }))],
        );
        let nodes = run(&Bios, &source, false);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "firmware");
        assert_eq!(nodes[0].version, "DELL   - 1072009");
        assert_eq!(nodes[0].serial, ERROR_SENTINEL);
    }

    #[test]
    fn bios_without_records_is_empty() {
        assert!(run(&Bios, &SnapshotSource::new(), true).is_empty());
    }
}
