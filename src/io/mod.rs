pub mod config_io;
pub mod fetch;
pub mod lock;
pub mod logging;
pub mod watcher;
pub mod workspace_io;
