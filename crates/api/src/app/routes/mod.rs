//! Route modules and the registry that mounts them.

use crate::app::registry::RouteModule;

pub mod admin;
pub mod in_transit;
pub mod system;

/// Every mounted route module, declared explicitly.
///
/// `relative_path` is the module's position under the logical routes root;
/// its mount path is derived from it (plus the context prefix) at startup.
pub fn registry() -> Vec<RouteModule> {
    vec![
        RouteModule {
            relative_path: "in_transit",
            collection: in_transit::collection,
        },
        RouteModule {
            relative_path: "admin/exports",
            collection: admin::exports::collection,
        },
    ]
}
