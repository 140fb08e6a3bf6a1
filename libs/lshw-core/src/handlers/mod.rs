//! Built-in hardware categories.

mod board;
mod bus;
mod controller;
mod devices;
mod memory;
mod processor;
mod storage;
mod system;
mod usb;
mod volume;

use crate::error::InventoryError;
use crate::handler::{CollectCtx, Scope};
use crate::registry::RegistryBuilder;
use crate::source::{Predicate, Query, Record};

/// Register every built-in category. Order matters: it is the order in which
/// children are collected under a shared parent, so `disk` comes after the
/// controller categories that may already have placed the same drives.
pub fn register_builtin(builder: &mut RegistryBuilder) -> Result<(), InventoryError> {
    builder
        .register("system", system::factory, &[])?
        .register("baseboard", board::base_board, &["system"])?
        .register("bios", board::bios, &["baseboard"])?
        .register("memory", memory::factory, &["baseboard"])?
        .register("pci", bus::factory, &["baseboard"])?
        .register("processor", processor::factory, &["baseboard"])?
        .register("ide", controller::ide, &["pci"])?
        .register("scsi", controller::scsi, &["pci"])?
        .register("network", devices::network, &["pci"])?
        .register("video", devices::video, &["pci"])?
        .register("usb", usb::controllers, &["pci"])?
        .register("usbdevices", usb::devices, &["usb"])?
        .register("sound", devices::sound, &["pci"])?
        .register("disk", storage::disk, &["pci", "ide", "scsi"])?
        .register("cdrom", storage::cdrom, &["ide", "scsi"])?
        .register("partition", volume::partition, &["disk"])?
        .register("volume", volume::logical_disk, &["partition"])?;
    Ok(())
}

/// Run a query whose records only decorate a structural node. Recoverable
/// failures are logged and read as "no records" so the node and its
/// children are still produced.
fn lookup_or_empty(
    ctx: &CollectCtx<'_>,
    category: &'static str,
    query: &Query,
) -> Result<Vec<Record>, InventoryError> {
    match ctx.query(category, query) {
        Err(err) if err.is_recoverable() => {
            tracing::warn!(category, error = %err, "Using placeholder values");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Restrict `query` to devices whose Plug and Play id contains the scoped id.
fn scoped_by_pnp(query: Query, scope: &Scope) -> Query {
    match scope.device() {
        Some(id) => query.filter(Predicate::contains("PNPDeviceID", id)),
        None => query,
    }
}
