//! # streamcall Core
//!
//! Domain types, traits, and error definitions for the streamcall agent.
//! This crate has **no HTTP dependencies** and uses only `tokio::sync` for the
//! fragment channel. It defines the model that the provider, service, and
//! agent crates implement against.
//!
//! ## Design Philosophy
//!
//! The two seams of the system are traits here:
//! - [`Provider`] — a completion backend that streams [`StreamFragment`]s
//! - [`ServiceFunction`] — a locally registered handler reachable through
//!   the [`ServiceRegistry`] by a `<service>-<function>` command name

pub mod agent;
pub mod command;
pub mod error;
pub mod message;
pub mod provider;
pub mod service;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentState, DEFAULT_MAX_DEPTH, DEFAULT_SYSTEM_MESSAGE};
pub use command::{CommandDescriptor, CommandName, COMMAND_SEPARATOR};
pub use error::{DispatchError, Error, ProviderError, Result, ServiceError};
pub use message::{Conversation, FunctionCall, Message, Role};
pub use provider::{FragmentReceiver, Provider, ProviderRequest, StreamFragment};
pub use service::{parse_arguments, ServiceFunction, ServiceRegistry};
