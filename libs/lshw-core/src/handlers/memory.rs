use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::Node;
use crate::record::Attrs;
use crate::source::{Entity, Query, Record};

const CATEGORY: &str = "memory";

pub(super) fn factory(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(PhysicalMemory)
}

/// `memory:0` container with one `bank:N` child per DIMM.
struct PhysicalMemory;

impl PhysicalMemory {
    fn bank(record: &Record, fallback_index: usize) -> Node {
        let attrs = Attrs::new(CATEGORY, record);
        let tag = attrs.opt_text("Tag");
        let index = tag
            .as_deref()
            .map(trailing_digits)
            .filter(|digits| !digits.is_empty())
            .map_or_else(|| fallback_index.to_string(), str::to_owned);

        let mut node = Node::new(format!("bank:{index}"), CATEGORY);
        node.description = attrs.text("Tag");
        node.product = attrs.text("MemoryType");
        node.slot = attrs.text("DeviceLocator");
        node.size = attrs.uint("Capacity");
        node.width = attrs.uint("DataWidth");
        node.clock = attrs.uint("Speed");
        node.units = "bytes".to_owned();
        node
    }

    /// Single bank sized from the total visible memory, for machines that
    /// expose no DIMM records (typically virtual machines).
    fn total_memory_bank(ctx: &CollectCtx<'_>) -> Result<Option<Node>, InventoryError> {
        let query = Query::new(Entity::ComputerSystem).fields(&["TotalPhysicalMemory"]);
        let records = ctx.query(CATEGORY, &query)?;
        Ok(records
            .first()
            .map(|record| Attrs::new(CATEGORY, record))
            .filter(|attrs| attrs.opt_text("TotalPhysicalMemory").is_some())
            .map(|attrs| {
                let mut node = Node::new("bank:0", CATEGORY);
                node.description = "System Memory".to_owned();
                node.slot = "System Board".to_owned();
                node.size = attrs.uint("TotalPhysicalMemory");
                node.units = "bytes".to_owned();
                node
            }))
    }
}

fn trailing_digits(tag: &str) -> &str {
    let start = tag
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map_or(tag.len(), |(i, _)| i);
    &tag[start..]
}

impl CategoryHandler for PhysicalMemory {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::PhysicalMemory).fields(&[
            "Tag",
            "DeviceLocator",
            "Capacity",
            "Speed",
            "MemoryType",
            "DataWidth",
        ]);
        let records = ctx.query(CATEGORY, &query)?;

        let banks: Vec<Node> = if records.is_empty() {
            Self::total_memory_bank(ctx)?.into_iter().collect()
        } else {
            records
                .iter()
                .enumerate()
                .map(|(i, record)| Self::bank(record, i))
                .collect()
        };
        if banks.is_empty() {
            return Ok(Vec::new());
        }

        let mut container = Node::new("memory:0", CATEGORY);
        container.description = "System Memory".to_owned();
        container.size = banks.iter().map(|bank| bank.size).sum();
        container.units = "bytes".to_owned();
        container.children = banks;
        Ok(vec![container])
    }
}
