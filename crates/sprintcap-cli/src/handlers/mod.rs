pub mod board;
pub mod changes;
pub mod sprint;
pub mod sync;
pub mod task;
