pub mod commands;
pub mod config;
pub mod constants;
pub mod database;
pub mod errors;
pub mod health;
pub mod scheduler;
pub mod services;
pub mod web;

// Re-export commonly used types
pub use commands::{Command, CommandHandler};
pub use config::{Config, ConfigManager};
pub use database::{Database, NodeRecord, NodeStatus};
pub use health::{NodeHealthAssessor, ReferenceNode};
pub use scheduler::CheckScheduler;
pub use services::{AlertAggregator, Notifier};
