//! Translation between remote task records and the local board.
//!
//! Inbound: a full project listing becomes a replacement set of sprints and
//! tasks. Outbound: pending ledger entries are folded per task into create,
//! update and section-move calls.

pub mod inbound;
pub mod outbound;

pub use inbound::{import_remote, FieldConfig, ImportResult, DEFAULT_POINTS};
pub use outbound::{export_changes, ExportReport};

/// Custom field name fragments used when no field id is configured.
pub const POINTS_FIELD_HINT: &str = "datapoints";
pub const SPRINT_FIELD_HINT: &str = "sprints";
