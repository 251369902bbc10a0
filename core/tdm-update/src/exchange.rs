//! Update exchange state machine, without I/O.
//!
//! ```text
//! Idle --start--> Pending --BindingReady--> AwaitingResponse --response--> Complete
//!                    |                            |
//!                    +------- failure ------------+-------------------------> Failed
//! ```
//!
//! Every transition into `Complete` or `Failed` yields
//! [`ExchangeStep::Release`]; the driver releases the binding and reports
//! [`UpdateExchange::outcome`].

use crate::error::{UpdateError, UpdateResult};
use crate::protocol::{Message, StatusReport};
use crate::transport::BindingEvent;
use std::fmt;
use tdm_types::{InstanceId, ProfileId, ResourceId, SchemaVersion};
use tracing::{debug, warn};

/// Where an exchange is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    /// Waiting for the binding to come up.
    Pending,
    /// Request sent.
    AwaitingResponse,
    Complete,
    Failed,
}

impl ExchangeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExchangeState::Complete | ExchangeState::Failed)
    }
}

/// Identifies the target of a pending update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateKey {
    pub profile_id: ProfileId,
    pub instance_id: InstanceId,
    pub resource_id: ResourceId,
    /// Property tags from the trait root.
    pub property: Vec<u32>,
    pub version: SchemaVersion,
}

impl fmt::Display for UpdateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.resource_id, self.profile_id, self.instance_id)?;
        for tag in &self.property {
            write!(f, "/{tag}")?;
        }
        write!(f, "@v{}", self.version)
    }
}

/// Reported once per update when it ends.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    UpdateComplete {
        key: UpdateKey,
        result: UpdateResult<StatusReport>,
    },
}

/// What the driver must do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeStep {
    /// Nothing yet; wait for the next event.
    Wait,
    /// Send this request on the binding.
    Send(Message),
    /// The exchange is over; release the binding.
    Release,
}

/// One update exchange.
#[derive(Debug)]
pub struct UpdateExchange {
    key: UpdateKey,
    request: Message,
    state: ExchangeState,
    outcome: Option<UpdateResult<StatusReport>>,
}

impl UpdateExchange {
    pub fn new(key: UpdateKey, request: Message) -> Self {
        Self {
            key,
            request,
            state: ExchangeState::Idle,
            outcome: None,
        }
    }

    pub fn key(&self) -> &UpdateKey {
        &self.key
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// The final result, once the exchange is terminal.
    pub fn outcome(&self) -> Option<&UpdateResult<StatusReport>> {
        self.outcome.as_ref()
    }

    /// Consumes the exchange, returning its result. An exchange that never
    /// finished reports a protocol error.
    pub fn into_outcome(self) -> UpdateResult<StatusReport> {
        self.outcome
            .unwrap_or_else(|| Err(UpdateError::Protocol(format!("exchange for {} did not finish", self.key))))
    }

    /// Leaves `Idle`. The driver should prepare the binding next.
    pub fn start(&mut self) -> UpdateResult<BindingEvent> {
        if self.state != ExchangeState::Idle {
            return Err(UpdateError::Protocol(format!(
                "exchange for {} already started ({:?})",
                self.key, self.state
            )));
        }
        self.state = ExchangeState::Pending;
        debug!(key = %self.key, "update pending");
        Ok(BindingEvent::PrepareRequested)
    }

    /// Feeds a binding event.
    pub fn on_binding_event(&mut self, event: &BindingEvent) -> ExchangeStep {
        match (self.state, event) {
            (ExchangeState::Pending, BindingEvent::PrepareRequested) => ExchangeStep::Wait,
            (ExchangeState::Pending, BindingEvent::BindingReady) => {
                self.state = ExchangeState::AwaitingResponse;
                ExchangeStep::Send(self.request.clone())
            }
            (
                ExchangeState::Pending | ExchangeState::AwaitingResponse,
                BindingEvent::PrepareFailed(reason) | BindingEvent::BindingFailed(reason),
            ) => self.finish(Err(UpdateError::Transport(reason.clone()))),
            (state, event) => {
                debug!(key = %self.key, ?state, ?event, "ignoring binding event");
                ExchangeStep::Wait
            }
        }
    }

    /// Feeds the publisher's answer, or the transport error in its place.
    pub fn on_response(&mut self, response: UpdateResult<Message>) -> ExchangeStep {
        if self.state != ExchangeState::AwaitingResponse {
            debug!(key = %self.key, state = ?self.state, "ignoring unexpected response");
            return ExchangeStep::Wait;
        }
        let result = match response {
            Ok(Message::StatusReport(report)) if report.is_success() => Ok(report),
            Ok(Message::StatusReport(report)) => {
                warn!(key = %self.key, code = %report.code, message = ?report.message, "update rejected");
                Err(UpdateError::Rejected(report.code))
            }
            Ok(other) => Err(UpdateError::Protocol(format!(
                "expected status report, got {:?}",
                other.message_type()
            ))),
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Ends a live exchange with `error`, as on timeout. No-op once terminal.
    pub fn fail(&mut self, error: UpdateError) -> ExchangeStep {
        if self.state.is_terminal() {
            return ExchangeStep::Wait;
        }
        self.finish(Err(error))
    }

    fn finish(&mut self, result: UpdateResult<StatusReport>) -> ExchangeStep {
        self.state = if result.is_ok() {
            ExchangeState::Complete
        } else {
            ExchangeState::Failed
        };
        match &result {
            Ok(_) => debug!(key = %self.key, "update complete"),
            Err(e) => debug!(key = %self.key, error = %e, "update failed"),
        }
        self.outcome = Some(result);
        ExchangeStep::Release
    }
}
