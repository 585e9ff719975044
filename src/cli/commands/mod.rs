//! CLI command implementations

pub mod config;
pub mod lock;
pub mod release;
pub mod snapshot;
pub mod watch;

pub use config::execute as config;
pub use lock::execute as lock;
pub use release::execute as release;
pub use snapshot::execute as snapshot;
pub use watch::execute as watch;
