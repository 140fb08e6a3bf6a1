use super::lookup_or_empty;
use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::{ERROR_SENTINEL, Node, UNKNOWN_SENTINEL};
use crate::record::Attrs;
use crate::source::{Entity, Query};

const CATEGORY: &str = "system";

/// SMBIOS chassis type names, indexed by `ChassisTypes` value minus one.
const CHASSIS_TYPES: [&str; 24] = [
    "Maybe Virtual Machine",
    "??",
    "Desktop",
    "low-profile",
    "Pizza Box",
    "mini-tower",
    "Full Tower",
    "Portable",
    "Laptop",
    "notebook",
    "Hand Held",
    "Docking Station",
    "All in One",
    "Sub Notebook",
    "Space-Saving",
    "Lunch Box",
    "Main System Chassis",
    "Lunch Box",
    "SubChassis",
    "Bus Expansion Chassis",
    "Peripheral Chassis",
    "Storage Chassis",
    "Rack Mount Unit",
    "Sealed-Case PC",
];

pub(super) fn factory(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(ComputerSystem)
}

/// Root of the report: the computer itself.
struct ComputerSystem;

impl ComputerSystem {
    fn chassis(ctx: &CollectCtx<'_>) -> Result<String, InventoryError> {
        let query = Query::new(Entity::SystemEnclosure).fields(&["ChassisTypes"]);
        let records = lookup_or_empty(ctx, CATEGORY, &query)?;
        let chassis = records
            .first()
            .and_then(|record| Attrs::new(CATEGORY, record).first_text("ChassisTypes"))
            .and_then(|code| code.parse::<usize>().ok())
            .and_then(|code| code.checked_sub(1))
            .and_then(|index| CHASSIS_TYPES.get(index))
            .copied()
            .unwrap_or(UNKNOWN_SENTINEL);
        Ok(chassis.to_owned())
    }

    /// `(uuid, serial)` from the product record. Blank values are not
    /// applicable; an unreadable record leaves both at the error sentinel.
    fn identity(ctx: &CollectCtx<'_>) -> Result<(String, String), InventoryError> {
        let query = Query::new(Entity::ComputerSystemProduct).fields(&["UUID", "IdentifyingNumber"]);
        let records = lookup_or_empty(ctx, CATEGORY, &query)?;
        let Some(record) = records.first() else {
            return Ok((ERROR_SENTINEL.to_owned(), ERROR_SENTINEL.to_owned()));
        };
        let attrs = Attrs::new(CATEGORY, record);
        let read = |field: &str| {
            attrs
                .opt_text(field)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SENTINEL.to_owned())
        };
        Ok((read("UUID"), read("IdentifyingNumber")))
    }
}

impl CategoryHandler for ComputerSystem {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::ComputerSystem).fields(&[
            "Model",
            "Name",
            "Description",
            "Manufacturer",
            "NumberOfProcessors",
        ]);
        let records = ctx.query(CATEGORY, &query)?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let chassis = Self::chassis(ctx)?;
        let (uuid, serial) = Self::identity(ctx)?;

        let mut nodes: Vec<Node> = records
            .iter()
            .map(|record| {
                let attrs = Attrs::new(CATEGORY, record);
                let mut node = Node::new(attrs.text("Name"), CATEGORY);
                node.description = format!("{}, {chassis}", attrs.text("Description"));
                node.product = attrs.text("Model");
                node.vendor = attrs.text("Manufacturer");
                node.serial.clone_from(&serial);
                node.set_config("chassis", chassis.as_str());
                node.set_config("cpus", attrs.text("NumberOfProcessors"));
                node.set_config("uuid", uuid.as_str());
                node
            })
            .collect();

        if include_children && let Some(root) = nodes.first_mut() {
            root.children = ctx.collect_children(CATEGORY, &Scope::All, true)?;
        }
        Ok(nodes)
    }
}
