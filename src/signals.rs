use crate::context::Context;
use std::sync::Arc;

/// Terminates `ctx` on SIGINT or SIGTERM. Can only be installed once per process.
pub fn initialize(ctx: Arc<Context>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        ctx.terminate();
    })
}
