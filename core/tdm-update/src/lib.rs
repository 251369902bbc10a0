//! Update and view exchanges for trait data.
//!
//! # Architecture
//!
//! - **Protocol**: the wire messages and their TLV form
//! - **Exchange**: the per-update state machine, free of I/O
//! - **Transport**: bindings to a publisher, plus loopback and mock transports
//! - **Client**: resolves catalog paths through the schema directory and
//!   drives exchanges with per-path ordering and a timeout
//! - **Server**: applies updates to and serves views from catalog stores
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tdm_update::{
//!     LoopbackTransport, SingleResourceCatalog, UpdateClient, UpdateClientConfig, UpdateServer,
//! };
//!
//! # fn demo(directory: tdm_schema::TraitSchemaDirectory) -> tdm_update::UpdateResult<()> {
//! let directory = Arc::new(directory);
//! let catalog = Arc::new(SingleResourceCatalog::new());
//! let server = Arc::new(UpdateServer::new(directory.clone(), catalog.clone()));
//! let client = UpdateClient::new(
//!     directory,
//!     catalog,
//!     Arc::new(LoopbackTransport::new(server)),
//!     UpdateClientConfig::default(),
//! )?;
//! # let _ = client;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
mod client;
pub mod config;
mod error;
pub mod exchange;
pub mod protocol;
mod server;
pub mod transport;

pub use catalog::{shared_store, SharedStore, SingleResourceCatalog, TraitCatalog, TraitInstanceInfo, TraitStore};
pub use client::{UpdateClient, UpdateEventHandler};
pub use config::{BindingConfig, ConcurrencyPolicy, SecurityMode, UpdateClientConfig, WrmpConfig};
pub use error::{UpdateError, UpdateResult};
pub use exchange::{ExchangeState, UpdateEvent, UpdateExchange, UpdateKey};
pub use protocol::{
    DataElement, DataPath, Message, MessageType, StatusCode, StatusReport, UpdateRequest, ViewRequest,
    ViewResponse,
};
pub use server::UpdateServer;
pub use transport::{Binding, BindingEvent, LoopbackTransport, Transport};
