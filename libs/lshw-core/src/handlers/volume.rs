use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::{ERROR_SENTINEL, Node, UNKNOWN_SENTINEL, is_real_value};
use crate::record::Attrs;
use crate::resolver::{AssociationPair, dependents_of};
use crate::source::{Entity, Predicate, Query, Record};

const DRIVE_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub(super) fn partition(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(DiskPartition { scope })
}

pub(super) fn logical_disk(scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(LogicalDisk { scope })
}

/// Records of `entity` reachable from the scoped device through the
/// `association` rows, in association order; every record when unscoped.
fn associated_records(
    ctx: &CollectCtx<'_>,
    category: &'static str,
    scope: &Scope,
    association: Entity,
    query: &Query,
) -> Result<Vec<Record>, InventoryError> {
    let Some(owner) = scope.device() else {
        return ctx.query(category, query);
    };

    let rows = ctx.associations(category, association)?;
    let pairs = AssociationPair::parse_all(category, &rows);
    let mut records = Vec::new();
    for device_id in dependents_of(&pairs, owner) {
        let scoped = query.clone().filter(Predicate::eq("DeviceID", device_id));
        records.extend(ctx.query(category, &scoped)?);
    }
    Ok(records)
}

/// Partitions of one disk (`volume:<Index>`).
struct DiskPartition {
    scope: Scope,
}

impl DiskPartition {
    fn node(record: &Record) -> Node {
        let attrs = Attrs::new("partition", record);
        let bootable = attrs.flag("Bootable");
        let boot_partition = attrs.flag("BootPartition");
        let primary = attrs.flag("PrimaryPartition");

        let mut node = Node::new(format!("volume:{}", attrs.text("Index")), "volume");
        node.vendor = "Windows".to_owned();
        node.description = match attrs.opt_text("Description") {
            Some(desc) if desc.eq_ignore_ascii_case("unknown") && bootable && boot_partition => {
                "Primary. Bootable. Boot partition. FAT32".to_owned()
            }
            Some(desc) => desc,
            None => ERROR_SENTINEL.to_owned(),
        };
        node.device_id = attrs.text("DeviceID");
        node.pnp_device_id = attrs.opt_text("PNPDeviceID").unwrap_or_default();
        node.size = attrs.uint("Size");
        node.capacity = node.size;
        node.units = "bytes".to_owned();

        let (primary, extended) = if primary {
            ("Primary partition", "No extended partition")
        } else {
            ("No primary partition", "Extended partition")
        };
        let mut boot = if bootable {
            "Bootable partition"
        } else {
            "No bootable partition"
        }
        .to_owned();
        if boot_partition {
            boot.push_str(" (active)");
        }
        node.set_capability("primary", primary);
        node.set_capability("extended", extended);
        node.set_capability("bootable", boot);
        if let Some(kind) = attrs.opt_text("Type") {
            node.set_config("type", kind);
        }
        node
    }
}

impl CategoryHandler for DiskPartition {
    fn category(&self) -> &'static str {
        "partition"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::DiskPartition).fields(&[
            "Bootable",
            "BootPartition",
            "DeviceID",
            "PNPDeviceID",
            "Index",
            "Type",
            "Size",
            "Description",
            "PrimaryPartition",
        ]);
        let records = associated_records(
            ctx,
            self.category(),
            &self.scope,
            Entity::DiskDriveToDiskPartition,
            &query,
        )?;

        let mut nodes = Vec::with_capacity(records.len());
        for record in &records {
            let mut node = Self::node(record);
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

/// Logical volumes mounted from one partition (`logicalvolume:<n>`, where
/// `n` is the drive letter's position in the alphabet).
struct LogicalDisk {
    scope: Scope,
}

impl LogicalDisk {
    fn node(record: &Record) -> Node {
        let attrs = Attrs::new("volume", record);
        let device_id = attrs.opt_text("DeviceID");
        let id = device_id
            .as_deref()
            .and_then(|id| id.chars().next())
            .and_then(|letter| DRIVE_LETTERS.find(letter.to_ascii_uppercase()))
            .map_or_else(|| ERROR_SENTINEL.to_owned(), |n| format!("logicalvolume:{n}"));
        let file_system = attrs.text_or("FileSystem", UNKNOWN_SENTINEL);

        let mut node = Node::new(id, "volume");
        node.device_id = device_id.unwrap_or_else(|| UNKNOWN_SENTINEL.to_owned());
        node.logical_name = attrs.text_or("VolumeName", UNKNOWN_SENTINEL);
        node.capacity = attrs.uint("Size");
        node.units = "bytes".to_owned();
        node.description = match attrs.opt_text("Description") {
            Some(desc) => format!(
                "{desc}. Volume name: [{}]. Label: {}. Filesystem: {file_system}",
                attrs.text_or("Name", UNKNOWN_SENTINEL),
                node.logical_name,
            ),
            None => ERROR_SENTINEL.to_owned(),
        };
        node.set_config("mount.fstype", file_system);
        node.set_config("state", "mounted");
        if let Some(free) = attrs.opt_text("FreeSpace") {
            node.set_config("free", free);
        }
        node
    }
}

impl CategoryHandler for LogicalDisk {
    fn category(&self) -> &'static str {
        "volume"
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        _include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let query = Query::new(Entity::LogicalDisk).fields(&[
            "Caption",
            "Name",
            "Description",
            "FileSystem",
            "VolumeName",
            "Size",
            "FreeSpace",
            "DeviceID",
            "DriveType",
        ]);
        let records = associated_records(
            ctx,
            self.category(),
            &self.scope,
            Entity::LogicalDiskToPartition,
            &query,
        )?;
        Ok(records.iter().map(Self::node).collect())
    }
}
