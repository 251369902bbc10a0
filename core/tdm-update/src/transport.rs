//! Transport layer abstraction.
//!
//! A [`Transport`] hands out one [`Binding`] per exchange. The binding is
//! prepared against a [`BindingConfig`], carries request/response pairs and
//! is released when the exchange ends. Release is idempotent and a released
//! binding refuses to send.

use crate::config::BindingConfig;
use crate::error::{UpdateError, UpdateResult};
use crate::protocol::Message;
use crate::server::UpdateServer;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};

/// What happened while bringing a binding up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingEvent {
    /// The binding has been asked to prepare.
    PrepareRequested,
    /// Preparation failed before the binding became usable.
    PrepareFailed(String),
    /// A prepared binding failed.
    BindingFailed(String),
    /// The binding can carry messages.
    BindingReady,
}

impl BindingEvent {
    /// The transport's reason, for failure events.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            BindingEvent::PrepareFailed(reason) | BindingEvent::BindingFailed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// A connection to one publisher for the length of one exchange.
#[async_trait]
pub trait Binding: Send {
    /// Brings the binding up. Returns `BindingReady` or a failure event.
    async fn prepare(&mut self, config: &BindingConfig) -> BindingEvent;

    /// Sends a request and waits for the publisher's answer.
    async fn send_request(&mut self, message: Message) -> UpdateResult<Message>;

    /// Tears the binding down. Calling this again does nothing.
    fn release(&mut self);

    /// Whether [`release`](Self::release) has run.
    fn is_released(&self) -> bool;
}

/// Creates bindings.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn new_binding(&self, config: &BindingConfig) -> UpdateResult<Box<dyn Binding>>;
}

// ── Loopback ─────────────────────────────────────────────────────

/// Connects clients to an in-process [`UpdateServer`]. Every message goes
/// through its byte encoding in both directions.
#[derive(Clone)]
pub struct LoopbackTransport {
    server: Arc<UpdateServer>,
}

impl LoopbackTransport {
    pub fn new(server: Arc<UpdateServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn new_binding(&self, _config: &BindingConfig) -> UpdateResult<Box<dyn Binding>> {
        Ok(Box::new(LoopbackBinding {
            server: self.server.clone(),
            ready: false,
            released: false,
        }))
    }
}

struct LoopbackBinding {
    server: Arc<UpdateServer>,
    ready: bool,
    released: bool,
}

#[async_trait]
impl Binding for LoopbackBinding {
    async fn prepare(&mut self, config: &BindingConfig) -> BindingEvent {
        if self.released {
            return BindingEvent::PrepareFailed("binding already released".into());
        }
        if let Err(e) = config.validate() {
            return BindingEvent::PrepareFailed(e.to_string());
        }
        self.ready = true;
        BindingEvent::BindingReady
    }

    async fn send_request(&mut self, message: Message) -> UpdateResult<Message> {
        if self.released {
            return Err(UpdateError::BindingReleased);
        }
        if !self.ready {
            return Err(UpdateError::Transport("binding not prepared".into()));
        }
        let request = message.encode()?;
        trace!(bytes = request.len(), "loopback request");
        let response = self.server.handle_bytes(&request)?;
        Message::decode(&response)
    }

    fn release(&mut self) {
        if !self.released {
            debug!("loopback binding released");
        }
        self.released = true;
        self.ready = false;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

/// A scripted transport for testing.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Script {
        prepare: VecDeque<BindingEvent>,
        responses: VecDeque<UpdateResult<Message>>,
        delay: Option<Duration>,
        sent: Vec<Message>,
        bindings: usize,
        releases: usize,
    }

    /// Replays queued prepare outcomes and responses, and records what the
    /// client sent. Prepare succeeds once the prepare queue is empty.
    /// Clones share one script.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        script: Arc<Mutex<Script>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn script(&self) -> std::sync::MutexGuard<'_, Script> {
            self.script.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Queues the event the next `prepare` returns.
        pub fn push_prepare(&self, event: BindingEvent) -> &Self {
            self.script().prepare.push_back(event);
            self
        }

        /// Queues the answer to the next request.
        pub fn push_response(&self, response: UpdateResult<Message>) -> &Self {
            self.script().responses.push_back(response);
            self
        }

        /// Makes every request wait this long before answering.
        pub fn set_delay(&self, delay: Duration) -> &Self {
            self.script().delay = Some(delay);
            self
        }

        /// Every message sent so far, in order.
        pub fn sent(&self) -> Vec<Message> {
            self.script().sent.clone()
        }

        /// How many bindings were created.
        pub fn bindings(&self) -> usize {
            self.script().bindings
        }

        /// How many bindings were released. Repeated releases of one
        /// binding count once.
        pub fn releases(&self) -> usize {
            self.script().releases
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn new_binding(&self, _config: &BindingConfig) -> UpdateResult<Box<dyn Binding>> {
            self.script().bindings += 1;
            Ok(Box::new(MockBinding {
                transport: self.clone(),
                released: false,
            }))
        }
    }

    struct MockBinding {
        transport: MockTransport,
        released: bool,
    }

    #[async_trait]
    impl Binding for MockBinding {
        async fn prepare(&mut self, _config: &BindingConfig) -> BindingEvent {
            self.transport
                .script()
                .prepare
                .pop_front()
                .unwrap_or(BindingEvent::BindingReady)
        }

        async fn send_request(&mut self, message: Message) -> UpdateResult<Message> {
            if self.released {
                return Err(UpdateError::BindingReleased);
            }
            let (delay, response) = {
                let mut script = self.transport.script();
                script.sent.push(message);
                (script.delay, script.responses.pop_front())
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response.unwrap_or_else(|| Err(UpdateError::Transport("no scripted response".into())))
        }

        fn release(&mut self) {
            if !self.released {
                self.released = true;
                self.transport.script().releases += 1;
            }
        }

        fn is_released(&self) -> bool {
            self.released
        }
    }
}
