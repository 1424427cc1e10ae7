//! Runtime crate for the revbot auto-response monitor.
//!
//! Hosts the platform API client, the versioned session cookie store, the
//! revision-creation collaborator, and the per-tick decision engine with its
//! polling loop.

mod monitor_runtime;

pub use monitor_runtime::cookie_store::{CookieSnapshot, CookieStore};
pub use monitor_runtime::revision_creation::{
    HttpRevisionCreator, RevisionCreator, RevisionDescriptor, RevisionRequest,
};
pub use monitor_runtime::{run_monitor, MonitorRuntime, MonitorRuntimeConfig};
