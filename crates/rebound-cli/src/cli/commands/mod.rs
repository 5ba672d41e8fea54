//! CLI command handlers, one per file.

mod classify;
mod fetch;
mod policy;

pub use classify::run_classify;
pub use fetch::{run_fetch, FetchArgs};
pub use policy::run_policy;
