//! This module provides reusable test utilities:
//! - Mock HTTP servers (node API + metrics, alert webhook)
//! - Test configuration builders
//! - Temporary on-disk test databases
//! - Common test data

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_node;
pub mod mock_webhook;
pub mod test_config;
pub mod test_data;
pub mod test_database;

// Re-export commonly used items
pub use mock_node::MockNodeServer;
pub use mock_webhook::MockWebhookServer;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
pub use test_database::TestDatabase;
