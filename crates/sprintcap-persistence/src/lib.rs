pub mod sink;
pub mod store;
pub mod traits;

pub use sink::{save_channel, spawn_save_worker, ChannelSink};
pub use store::*;
pub use traits::*;
