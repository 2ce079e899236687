pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use config::{AppConfig, BoardConfig, RemoteConfig};
pub use error::PlannerError;
pub use result::PlannerResult;
pub use traits::{Clock, FixedClock, SystemClock};
