//! Shared domain helpers for the revbot auto-response monitor.
//!
//! Provides the platform feed payload types, auth-expiry detection,
//! response-template assembly, and the pure selection/gating predicates
//! consumed by the runtime crate.

pub mod auth_expiry;
pub mod gating;
pub mod project_feed;
pub mod response_templates;
pub mod target_selection;
pub mod tick_report;
