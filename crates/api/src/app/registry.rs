//! Explicit route-module registry and mounting.
//!
//! Route modules are declared statically (see `routes::registry`) rather
//! than discovered by scanning a directory: each module names the logical
//! path it would sit at under a routes root, and mounting derives its URL
//! prefix from that. Everything here runs exactly once, synchronously,
//! before the listener accepts its first connection.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::response::Response;
use axum::routing::MethodFilter;
use futures::future::BoxFuture;
use thiserror::Error;

use stockops_core::{ApiError, MountError, mount_path};

use crate::app::{boundary, errors};
use crate::app::services::AppServices;
use crate::context::HandlerContext;

/// Boxed future every registered handler resolves to.
pub type HandlerFuture = BoxFuture<'static, Result<Response, ApiError>>;

/// Boxed handler signature every route entry stores. Keeping the whole
/// open-ended set of handlers behind one signature is what lets the error
/// boundary wrap them uniformly.
pub type Handler = Arc<dyn Fn(HandlerContext) -> HandlerFuture + Send + Sync>;

/// One method + path + handler registration inside a module.
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub handler: Handler,
}

/// Ordered set of route entries exported by one module.
#[derive(Default)]
pub struct HandlerCollection {
    entries: Vec<RouteEntry>,
}

impl HandlerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` at `path` (relative to the module's
    /// mount path).
    pub fn route<H, Fut>(mut self, method: Method, path: &'static str, handler: H) -> Self
    where
        H: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        let handler: Handler =
            Arc::new(move |ctx: HandlerContext| -> HandlerFuture { Box::pin(handler(ctx)) });
        self.entries.push(RouteEntry {
            method,
            path,
            handler,
        });
        self
    }

    pub fn get<H, Fut>(self, path: &'static str, handler: H) -> Self
    where
        H: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<H, Fut>(self, path: &'static str, handler: H) -> Self
    where
        H: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [RouteEntry] {
        &mut self.entries
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    fn into_entries(self) -> Vec<RouteEntry> {
        self.entries
    }
}

/// A statically-declared route module: the logical path the module sits at
/// plus a constructor for its handler collection.
pub struct RouteModule {
    pub relative_path: &'static str,
    pub collection: fn() -> HandlerCollection,
}

/// Mounting failed; the process must not begin serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route registry is empty")]
    EmptyRegistry,

    #[error("mount path `{0}` derived for two different route modules")]
    DuplicateMountPath(String),

    #[error("unsupported HTTP method {method} on `{path}`")]
    UnsupportedMethod { method: Method, path: &'static str },

    #[error(transparent)]
    Mount(#[from] MountError),
}

/// Mount every registered module into one router.
///
/// Each collection is passed through the error boundary before anything is
/// registered, so no handler reaches the router unwrapped. One success line
/// is logged per mounted module.
pub fn load(
    registry: Vec<RouteModule>,
    context_path: &str,
    services: &Arc<AppServices>,
) -> Result<Router, StartupError> {
    if registry.is_empty() {
        return Err(StartupError::EmptyRegistry);
    }

    let mut mounted = BTreeSet::new();
    let mut router = Router::new();

    for module in registry {
        let mount = mount_path(context_path, module.relative_path)?;
        if !mounted.insert(mount.clone()) {
            return Err(StartupError::DuplicateMountPath(mount));
        }

        let mut collection = (module.collection)();
        boundary::wrap(&mut collection);

        router = router.nest(&mount, into_router(collection, services)?);
        tracing::info!(mount = %mount, "route module mounted");
    }

    Ok(router)
}

fn into_router(
    collection: HandlerCollection,
    services: &Arc<AppServices>,
) -> Result<Router, StartupError> {
    let mut router = Router::new();

    for entry in collection.into_entries() {
        let RouteEntry {
            method,
            path,
            handler,
        } = entry;

        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| StartupError::UnsupportedMethod { method, path })?;

        let services = Arc::clone(services);
        let dispatch = move |req: axum::extract::Request| {
            let handler = Arc::clone(&handler);
            let services = Arc::clone(&services);
            async move {
                let mode = services.config.mode;
                match HandlerContext::from_request(req, services).await {
                    Ok(ctx) => {
                        let responder = ctx.responder();
                        match handler(ctx).await {
                            Ok(response) => response,
                            Err(err) => errors::sink(err, Some(responder), mode),
                        }
                    }
                    // No contract is attached yet when context construction
                    // fails; these render as the fallback shape.
                    Err(err) => errors::sink(err, None, mode),
                }
            }
        };

        router = router.route(path, axum::routing::on(filter, dispatch));
    }

    Ok(router)
}
