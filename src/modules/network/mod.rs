//! Network Device Modules
//!
//! Declarative resource modules for Cisco IOS devices. Instead of pushing
//! raw configuration lines, each module parses the device's running
//! configuration into structured facts, compares them with the declared
//! configuration and emits only the commands needed to converge.
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Make sure the management VLAN exists
//!   ios_vlans:
//!     config:
//!       - vlan_id: 99
//!         name: mgmt
//!     state: merged
//!
//! - name: Read the current ACLs without changing anything
//!   ios_acls:
//!     state: gathered
//! ```
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +-------------------+
//! |   ios_hostname   |---->|  NetworkDevice    |
//! |   ios_vlans      |     |  get_config       |
//! |   ios_acls ...   |     |  edit_config      |
//! +------------------+     +-------------------+
//!         |
//!         v
//! +------------------+
//! |  resource engine |
//! |  parse / compare |
//! |  render          |
//! +------------------+
//! ```

pub mod common;
pub mod ios;
pub mod resource;

// Re-export main types for convenience
pub use common::{
    apply_output_filter, generate_config_diff, parse_config_input,
    NetworkDevice, NetworkPlatform, StaticDevice,
};
pub use ios::{ios_resource_module_names, register_ios_resource_modules};
pub use resource::{Prefix, ResourceModule, ResourceState};
