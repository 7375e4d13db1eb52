//! Operator commands
//!
//! Chat-style text commands (`/add`, `/del`, `/nodes`, ...) are parsed into
//! [`Command`] and executed against the store by [`CommandHandler`]. Input
//! validation happens here, at the boundary; records in the store are
//! always well formed.

use anyhow::Result;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::{commands, replies};
use crate::database::{Database, NodeRecord};
use crate::errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add(NodeRegistration),
    Delete { address: String },
    Nodes,
}

/// Validated arguments of `/add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRegistration {
    pub address: String,
    pub api_port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub seed_port: Option<u16>,
}

impl Command {
    /// Parse one command line. The leading `/` and a trailing `@botname` on
    /// the command word are optional.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let mut tokens = text.split_whitespace();
        let word = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        let name = word.strip_prefix('/').unwrap_or(word);
        let name = name.split('@').next().unwrap_or(name).to_lowercase();

        match name.as_str() {
            "start" => Ok(Command::Start),
            "help" => Ok(Command::Help),
            "nodes" => Ok(Command::Nodes),
            "add" => NodeRegistration::from_args(&args).map(Command::Add),
            "del" => match args.as_slice() {
                [] => Err(ValidationError::MissingArgument {
                    command: "del".to_string(),
                    argument: "ip-address".to_string(),
                }),
                [address] => Ok(Command::Delete {
                    address: parse_address(address)?,
                }),
                _ => Err(ValidationError::WrongArity {
                    command: "del".to_string(),
                    expected: 1,
                    got: args.len(),
                }),
            },
            _ => Err(ValidationError::UnknownCommand {
                command: word.to_string(),
            }),
        }
    }
}

impl NodeRegistration {
    /// Build from `<ip-address> <API port> <Met port> <SEED port>`.
    pub fn from_args(args: &[&str]) -> Result<Self, ValidationError> {
        let [address, api, metrics, seed] = args else {
            return Err(ValidationError::WrongArity {
                command: "add".to_string(),
                expected: commands::ADD_ARITY,
                got: args.len(),
            });
        };

        Ok(Self {
            address: parse_address(address)?,
            api_port: parse_port("API port", api)?,
            metrics_port: parse_port("Metrics port", metrics)?,
            seed_port: parse_port("Seed port", seed)?,
        })
    }

    pub fn into_record(self, owner_id: &str) -> NodeRecord {
        NodeRecord::new(
            owner_id,
            self.address,
            self.api_port,
            self.metrics_port,
            self.seed_port,
        )
    }
}

/// Canonical text form, so `/del` matches whatever spelling `/add` used.
fn parse_address(value: &str) -> Result<String, ValidationError> {
    value
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| ValidationError::InvalidAddress {
            value: value.to_string(),
        })
}

fn parse_port(name: &str, value: &str) -> Result<Option<u16>, ValidationError> {
    if value == commands::SKIP_PORT {
        return Ok(None);
    }
    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(Some(port)),
        _ => Err(ValidationError::InvalidPort {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn help_text() -> String {
    replies::HELP_LINES.join("\n")
}

/// Reply shown to the operator for rejected input
fn rejection_reply(error: &ValidationError) -> String {
    match error {
        ValidationError::WrongArity { command, .. }
        | ValidationError::MissingArgument { command, .. } => match command.as_str() {
            "add" => replies::ADD_USAGE.to_string(),
            "del" => replies::DEL_USAGE.to_string(),
            _ => format!("❌ {}", error),
        },
        ValidationError::UnknownCommand { .. } => replies::UNKNOWN_COMMAND.to_string(),
        ValidationError::InvalidAddress { .. } | ValidationError::InvalidPort { .. } => {
            format!("❌ {}", error)
        }
    }
}

pub struct CommandHandler {
    database: Arc<Database>,
}

impl CommandHandler {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Execute `text` on behalf of `owner_id` and return the reply.
    ///
    /// Invalid input becomes a reply; only store failures are errors.
    pub async fn handle(&self, owner_id: &str, text: &str) -> Result<String> {
        let command = match Command::parse(text) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected command from {}: {}", owner_id, e);
                return Ok(rejection_reply(&e));
            }
        };

        match command {
            Command::Start => Ok(format!("{}\n{}", replies::GREETING, help_text())),
            Command::Help => Ok(help_text()),
            Command::Add(registration) => {
                let record = self
                    .database
                    .register_node(&registration.into_record(owner_id))
                    .await?;
                info!("Owner {} registered node {}", owner_id, record.address);
                Ok(replies::NODE_ADDED.to_string())
            }
            Command::Delete { address } => {
                if self.database.delete_node(owner_id, &address).await? {
                    info!("Owner {} deleted node {}", owner_id, address);
                    Ok(format!("{}: {}", replies::NODE_DELETED, address))
                } else {
                    Ok(format!("{}: {}", replies::NODE_NOT_FOUND, address))
                }
            }
            Command::Nodes => {
                let records = self.database.get_nodes_by_owner(owner_id).await?;
                if records.is_empty() {
                    return Ok(replies::NO_NODES.to_string());
                }
                Ok(records
                    .iter()
                    .map(|record| record.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }
}
