//! HTTP request handlers.
//!
//! - `common` - Response envelope shared by every endpoint
//! - `commands` - Operator command execution
//! - `nodes` - Per-owner node listing
//! - `status` - Service status and counters

pub mod commands;
pub mod common;
pub mod nodes;
pub mod status;

pub use commands::execute_command;
pub use nodes::get_owner_nodes;
pub use status::get_status;
