//! Update and view client.

use crate::catalog::TraitCatalog;
use crate::config::{ConcurrencyPolicy, UpdateClientConfig};
use crate::error::{UpdateError, UpdateResult};
use crate::exchange::{ExchangeStep, UpdateEvent, UpdateExchange, UpdateKey};
use crate::protocol::{DataElement, DataPath, Message, StatusReport, UpdateRequest, ViewRequest};
use crate::transport::{Binding, BindingEvent, Transport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tdm_schema::data::validate_value;
use tdm_schema::{SchemaError, TraitSchemaDirectory, TraitSchemaEngine};
use tdm_tlv::TlvValue;
use tdm_types::TraitPath;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

/// Receives exchange progress.
pub trait UpdateEventHandler: Send + Sync {
    fn on_binding_event(&self, _key: &UpdateKey, _event: &BindingEvent) {}

    fn on_update_event(&self, event: &UpdateEvent);
}

/// Sends updates and view requests for cataloged trait instances.
pub struct UpdateClient {
    directory: Arc<TraitSchemaDirectory>,
    catalog: Arc<dyn TraitCatalog>,
    transport: Arc<dyn Transport>,
    config: UpdateClientConfig,
    handler: Option<Arc<dyn UpdateEventHandler>>,
    in_flight: Mutex<HashMap<TraitPath, Arc<Semaphore>>>,
}

/// Holds a path's turn until dropped.
struct PathTicket<'a> {
    client: &'a UpdateClient,
    path: TraitPath,
    _permit: OwnedSemaphorePermit,
}

impl Drop for PathTicket<'_> {
    fn drop(&mut self) {
        let Ok(mut in_flight) = self.client.in_flight.lock() else {
            return;
        };
        // The map and our permit hold the only references: nobody is queued.
        if in_flight.get(&self.path).is_some_and(|s| Arc::strong_count(s) == 2) {
            in_flight.remove(&self.path);
        }
    }
}

/// Releases the binding it holds when dropped, so a cancelled exchange
/// still tears its binding down.
#[derive(Default)]
struct BindingSlot(Option<Box<dyn Binding>>);

impl BindingSlot {
    fn insert(&mut self, binding: Box<dyn Binding>) -> &mut Box<dyn Binding> {
        self.0.insert(binding)
    }
}

impl Drop for BindingSlot {
    fn drop(&mut self) {
        if let Some(binding) = self.0.as_mut() {
            binding.release();
        }
    }
}

impl UpdateClient {
    pub fn new(
        directory: Arc<TraitSchemaDirectory>,
        catalog: Arc<dyn TraitCatalog>,
        transport: Arc<dyn Transport>,
        config: UpdateClientConfig,
    ) -> UpdateResult<Self> {
        config.validate()?;
        Ok(Self {
            directory,
            catalog,
            transport,
            config,
            handler: None,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_handler(mut self, handler: Arc<dyn UpdateEventHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn config(&self) -> &UpdateClientConfig {
        &self.config
    }

    /// Sets the property at `path` on the publisher to `value`.
    pub async fn update(&self, path: TraitPath, value: TlvValue) -> UpdateResult<StatusReport> {
        self.update_with_argument(path, value, None).await
    }

    /// [`update`](Self::update) with an application argument attached to
    /// the request.
    pub async fn update_with_argument(
        &self,
        path: TraitPath,
        value: TlvValue,
        argument: Option<TlvValue>,
    ) -> UpdateResult<StatusReport> {
        let (key, request) = self.prepare_update(path, value, argument)?;
        let ticket = self.acquire(path).await?;

        let mut exchange = UpdateExchange::new(key.clone(), request);
        let mut binding = BindingSlot::default();
        let run = tokio::time::timeout(
            self.config.update_timeout(),
            self.drive(&mut exchange, &mut binding),
        )
        .await;
        if run.is_err() {
            warn!(key = %key, timeout_ms = self.config.update_timeout_ms, "update timed out");
            exchange.fail(UpdateError::Timeout);
        }
        drop(binding);
        drop(ticket);

        let result = exchange.into_outcome();
        if let Some(handler) = &self.handler {
            handler.on_update_event(&UpdateEvent::UpdateComplete {
                key: key.clone(),
                result: result.clone(),
            });
        }
        match &result {
            Ok(_) => info!(key = %key, "update acknowledged"),
            Err(e) => warn!(key = %key, error = %e, "update failed"),
        }
        result
    }

    /// Reads the current value at `path` from the publisher.
    pub async fn view(&self, path: TraitPath) -> UpdateResult<TlvValue> {
        let (schema, data_path) = self.data_path(path)?;
        let key = Self::key_for(&schema, &data_path);
        let request = Message::ViewRequest(ViewRequest {
            paths: vec![data_path],
        });

        let mut binding = BindingSlot::default();
        let run = tokio::time::timeout(self.config.update_timeout(), async {
            let binding = self.bind(&key, &mut binding).await?;
            self.send(&key, binding, request).await
        })
        .await;
        drop(binding);

        match run.map_err(|_| UpdateError::Timeout)?? {
            Message::ViewResponse(mut response) if response.elements.len() == 1 => {
                Ok(response.elements.remove(0).data)
            }
            Message::StatusReport(report) if !report.is_success() => Err(UpdateError::Rejected(report.code)),
            other => Err(UpdateError::Protocol(format!(
                "unexpected view answer {:?}",
                other.message_type()
            ))),
        }
    }

    // ── Internal ─────────────────────────────────────────────────

    /// Resolves a catalog path to its schema and wire path.
    fn data_path(&self, path: TraitPath) -> UpdateResult<(Arc<TraitSchemaEngine>, DataPath)> {
        let info = self.catalog.locate(path.trait_data_handle)?;
        let schema = self.directory.require(info.profile_id)?;
        let tags = schema.tag_path(path.property_handle).map_err(|e| match e {
            SchemaError::HandleNotFound { .. } => UpdateError::PropertyNotFound {
                path,
                reason: e.to_string(),
            },
            other => other.into(),
        })?;
        let data_path = DataPath {
            profile_id: info.profile_id,
            instance_id: info.instance_id,
            resource_id: info.resource_id,
            schema_version: Some(schema.version_range().max()),
            tags,
        };
        Ok((schema, data_path))
    }

    fn key_for(schema: &TraitSchemaEngine, data_path: &DataPath) -> UpdateKey {
        UpdateKey {
            profile_id: data_path.profile_id,
            instance_id: data_path.instance_id,
            resource_id: data_path.resource_id,
            property: data_path.tags.clone(),
            version: schema.version_range().max(),
        }
    }

    fn prepare_update(
        &self,
        path: TraitPath,
        value: TlvValue,
        argument: Option<TlvValue>,
    ) -> UpdateResult<(UpdateKey, Message)> {
        let (schema, data_path) = self.data_path(path)?;
        validate_value(&schema, path.property_handle, &value)?;
        let key = Self::key_for(&schema, &data_path);
        let request = Message::UpdateRequest(UpdateRequest {
            elements: vec![DataElement {
                path: data_path,
                data_version: None,
                data: value,
            }],
            argument,
        });
        let bytes = request.encode()?;
        debug!(key = %key, bytes = bytes.len(), "encoded update request");
        Ok((key, request))
    }

    async fn acquire(&self, path: TraitPath) -> UpdateResult<PathTicket<'_>> {
        let semaphore = {
            let mut in_flight = self
                .in_flight
                .lock()
                .map_err(|e| UpdateError::Store(format!("in-flight table poisoned: {e}")))?;
            in_flight
                .entry(path)
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };
        let permit = match self.config.concurrency {
            ConcurrencyPolicy::Queue => semaphore
                .acquire_owned()
                .await
                .map_err(|_| UpdateError::Store("path queue closed".into()))?,
            ConcurrencyPolicy::Reject => semaphore.try_acquire_owned().map_err(|_| {
                debug!(path = %path, "update already in flight");
                UpdateError::UpdateInFlight(path)
            })?,
        };
        Ok(PathTicket {
            client: self,
            path,
            _permit: permit,
        })
    }

    async fn bind<'b>(
        &self,
        key: &UpdateKey,
        slot: &'b mut BindingSlot,
    ) -> UpdateResult<&'b mut Box<dyn Binding>> {
        self.notify(key, &BindingEvent::PrepareRequested);
        let binding = slot.insert(self.transport.new_binding(&self.config.binding).await?);
        let event = binding.prepare(&self.config.binding).await;
        self.notify(key, &event);
        match event.failure_reason() {
            Some(reason) => Err(UpdateError::Transport(reason.to_string())),
            None => Ok(binding),
        }
    }

    async fn drive(&self, exchange: &mut UpdateExchange, slot: &mut BindingSlot) {
        let key = exchange.key().clone();
        let event = match exchange.start() {
            Ok(event) => event,
            Err(e) => {
                exchange.fail(e);
                return;
            }
        };
        self.notify(&key, &event);

        let binding = match self.transport.new_binding(&self.config.binding).await {
            Ok(binding) => slot.insert(binding),
            Err(e) => {
                exchange.fail(e);
                return;
            }
        };
        let event = binding.prepare(&self.config.binding).await;
        self.notify(&key, &event);

        let mut step = exchange.on_binding_event(&event);
        while let ExchangeStep::Send(request) = step {
            let response = self.send(&key, binding, request).await;
            step = exchange.on_response(response);
        }
        if !exchange.state().is_terminal() {
            exchange.fail(UpdateError::Transport(format!("binding stopped at {event:?}")));
        }
    }

    /// Sends one request, waiting at most the binding's response timeout.
    async fn send(
        &self,
        key: &UpdateKey,
        binding: &mut Box<dyn Binding>,
        request: Message,
    ) -> UpdateResult<Message> {
        let timeout = self.config.binding.response_timeout();
        match tokio::time::timeout(timeout, binding.send_request(request)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(key = %key, timeout_ms = self.config.binding.response_timeout_ms, "no response from publisher");
                Err(UpdateError::Timeout)
            }
        }
    }

    fn notify(&self, key: &UpdateKey, event: &BindingEvent) {
        debug!(key = %key, ?event, "binding event");
        if let Some(handler) = &self.handler {
            handler.on_binding_event(key, event);
        }
    }
}
