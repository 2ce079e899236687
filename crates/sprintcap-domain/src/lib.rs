pub mod board;
pub mod change;
pub mod commands;
pub mod date_window;
pub mod demo;
pub mod field_update;
pub mod ledger;
pub mod palette;
pub mod query;
pub mod snapshot;
pub mod sprint;
pub mod task;

pub use board::BoardState;
pub use change::{ChangeField, ChangeId, ChangeValue, PendingChange};
pub use date_window::{parse_window, DateWindow};
pub use field_update::FieldUpdate;
pub use ledger::ChangeLedger;
pub use query::SprintLoad;
pub use snapshot::{BoardSnapshot, NoopSink, SnapshotSink};
pub use sprint::{natural_cmp, Sprint};
pub use task::{NewTask, SprintName, Task, TaskId, TaskStatus, TaskUpdate, BACKLOG_LABEL};
