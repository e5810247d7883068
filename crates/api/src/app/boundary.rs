//! Uniform failure capture around every registered handler.
//!
//! Handlers already report failures as `Err(ApiError)`. A panic, raised
//! before the handler returns its future or while that future is polled,
//! is the one escape hatch the signature cannot close, so every handler is
//! wrapped once at registration: both panic shapes are caught and converted
//! into a single `ApiError`, and exactly one failure (or one response) ever
//! reaches the caller. No handler opts in; the registry applies the wrapper
//! to whatever a module exports.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use stockops_core::ApiError;

use super::registry::{Handler, HandlerCollection, HandlerFuture};
use crate::context::HandlerContext;

/// Replace every handler in `collection`, in place, with a capturing
/// wrapper.
pub fn wrap(collection: &mut HandlerCollection) {
    for entry in collection.entries_mut() {
        entry.handler = wrap_handler(Arc::clone(&entry.handler));
    }
}

fn wrap_handler(inner: Handler) -> Handler {
    Arc::new(move |ctx: HandlerContext| -> HandlerFuture {
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            // A panic before the future exists is the synchronous case.
            let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| inner(ctx))) {
                Ok(fut) => fut,
                Err(payload) => return Err(panic_error(payload.as_ref())),
            };

            // A panic while polling is the asynchronous case.
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(panic_error(payload.as_ref())),
            }
        })
    })
}

fn panic_error(payload: &(dyn Any + Send)) -> ApiError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_owned()
    };
    ApiError::Handler(anyhow::anyhow!("handler panicked: {message}"))
}
