use crate::error::InventoryError;
use crate::handler::{CategoryHandler, CollectCtx, Scope};
use crate::model::Node;
use crate::resolver::ControllerChain;

pub(super) fn ide(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Controllers(ControllerChain::IDE))
}

pub(super) fn scsi(_scope: Scope) -> Box<dyn CategoryHandler> {
    Box::new(Controllers(ControllerChain::SCSI))
}

/// Storage controllers reconstructed from their association rows.
struct Controllers(ControllerChain);

impl CategoryHandler for Controllers {
    fn category(&self) -> &'static str {
        self.0.category
    }

    fn collect(
        &self,
        ctx: &mut CollectCtx<'_>,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        self.0.resolve(ctx, include_children)
    }
}
