//! CLI command implementations

pub mod activate;
pub mod clear;
pub mod config;
pub mod content;
pub mod fetch;
pub mod install;
pub mod message;
pub mod namespaces;
pub mod push;
pub mod status;
pub mod sync;

pub use activate::execute as activate;
pub use clear::execute as clear;
pub use config::execute as config;
pub use content::execute as content;
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use message::execute as message;
pub use namespaces::execute as namespaces;
pub use push::execute as push;
pub use status::execute as status;
pub use sync::{execute as sync, execute_periodic as periodic_sync};
