//! Cisco IOS resource modules
//!
//! Each submodule defines one resource: a typed configuration schema, a
//! static parser/renderer catalog and the layout the reconciler walks.
//!
//! | Module              | Shape                                  |
//! |---------------------|----------------------------------------|
//! | `ios_hostname`      | single record                          |
//! | `ios_interfaces`    | keyed by `name`                        |
//! | `ios_vlans`         | keyed by `vlan_id`                     |
//! | `ios_vrfs`          | keyed by `name`                        |
//! | `ios_bfd_templates` | keyed by `name`                        |
//! | `ios_acls`          | keyed by `name`, entries by `sequence` |

pub mod acls;
pub mod bfd_templates;
pub mod hostname;
pub mod interfaces;
pub mod vlans;
pub mod vrfs;

pub use acls::AclsResource;
pub use bfd_templates::BfdTemplatesResource;
pub use hostname::HostnameResource;
pub use interfaces::InterfacesResource;
pub use vlans::VlansResource;
pub use vrfs::VrfsResource;

use std::sync::Arc;

use super::resource::{Prefix, Resource, ResourceModule};
use crate::modules::ModuleRegistry;

fn module<R: Resource>(prefix: &Prefix) -> Arc<ResourceModule<R>> {
    Arc::new(ResourceModule::<R>::new().with_prefix(prefix.clone()))
}

/// Register all IOS resource modules with the registry
pub fn register_ios_resource_modules(registry: &mut ModuleRegistry, prefix: &Prefix) {
    registry.register(module::<HostnameResource>(prefix));
    registry.register(module::<InterfacesResource>(prefix));
    registry.register(module::<VlansResource>(prefix));
    registry.register(module::<VrfsResource>(prefix));
    registry.register(module::<BfdTemplatesResource>(prefix));
    registry.register(module::<AclsResource>(prefix));
}

/// Get a list of all IOS resource module names
pub fn ios_resource_module_names() -> Vec<&'static str> {
    vec![
        HostnameResource::MODULE,
        InterfacesResource::MODULE,
        VlansResource::MODULE,
        VrfsResource::MODULE,
        BfdTemplatesResource::MODULE,
        AclsResource::MODULE,
    ]
}
