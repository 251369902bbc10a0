use pretty_assertions::assert_eq;
use tdm_tlv::TlvValue;
use tdm_types::{InstanceId, ProfileId, ResourceId};
use tdm_update::exchange::ExchangeStep;
use tdm_update::{
    BindingEvent, DataElement, DataPath, ExchangeState, Message, StatusCode, StatusReport, UpdateError,
    UpdateExchange, UpdateKey, UpdateRequest,
};

fn key() -> UpdateKey {
    UpdateKey {
        profile_id: ProfileId::new(0, 0x0016),
        instance_id: InstanceId::default(),
        resource_id: ResourceId::SELF_NODE,
        property: vec![1],
        version: 1,
    }
}

fn request() -> Message {
    Message::UpdateRequest(UpdateRequest {
        elements: vec![DataElement {
            path: DataPath {
                tags: vec![1],
                ..DataPath::root(ProfileId::new(0, 0x0016), InstanceId::default())
            },
            data_version: None,
            data: TlvValue::from("en_GB"),
        }],
        argument: None,
    })
}

fn started() -> UpdateExchange {
    let mut exchange = UpdateExchange::new(key(), request());
    assert_eq!(exchange.start().unwrap(), BindingEvent::PrepareRequested);
    exchange
}

#[test]
fn happy_path() {
    let mut exchange = UpdateExchange::new(key(), request());
    assert_eq!(exchange.state(), ExchangeState::Idle);
    exchange.start().unwrap();
    assert_eq!(exchange.state(), ExchangeState::Pending);

    assert_eq!(exchange.on_binding_event(&BindingEvent::PrepareRequested), ExchangeStep::Wait);
    assert_eq!(exchange.on_binding_event(&BindingEvent::BindingReady), ExchangeStep::Send(request()));
    assert_eq!(exchange.state(), ExchangeState::AwaitingResponse);

    let step = exchange.on_response(Ok(Message::StatusReport(StatusReport::success())));
    assert_eq!(step, ExchangeStep::Release);
    assert_eq!(exchange.state(), ExchangeState::Complete);
    assert_eq!(exchange.outcome(), Some(&Ok(StatusReport::success())));
}

#[test]
fn start_twice_is_an_error() {
    let mut exchange = started();
    assert!(matches!(exchange.start(), Err(UpdateError::Protocol(_))));
}

#[test]
fn prepare_failure_fails_with_reason() {
    let mut exchange = started();
    let step = exchange.on_binding_event(&BindingEvent::PrepareFailed("no route".into()));
    assert_eq!(step, ExchangeStep::Release);
    assert_eq!(exchange.state(), ExchangeState::Failed);
    assert_eq!(exchange.into_outcome(), Err(UpdateError::Transport("no route".into())));
}

#[test]
fn binding_failure_while_awaiting_response() {
    let mut exchange = started();
    exchange.on_binding_event(&BindingEvent::BindingReady);
    let step = exchange.on_binding_event(&BindingEvent::BindingFailed("peer closed".into()));
    assert_eq!(step, ExchangeStep::Release);
    assert_eq!(exchange.outcome(), Some(&Err(UpdateError::Transport("peer closed".into()))));
}

#[test]
fn failure_status_is_a_rejection() {
    let mut exchange = started();
    exchange.on_binding_event(&BindingEvent::BindingReady);
    exchange.on_response(Ok(Message::StatusReport(StatusReport::failure(
        StatusCode::UnknownTrait,
        Some(0),
        "nope",
    ))));
    assert_eq!(exchange.into_outcome(), Err(UpdateError::Rejected(StatusCode::UnknownTrait)));
}

#[test]
fn wrong_response_type_is_a_protocol_error() {
    let mut exchange = started();
    exchange.on_binding_event(&BindingEvent::BindingReady);
    exchange.on_response(Ok(request()));
    assert!(matches!(exchange.into_outcome(), Err(UpdateError::Protocol(_))));
}

#[test]
fn terminal_exchange_ignores_further_events() {
    let mut exchange = started();
    exchange.on_binding_event(&BindingEvent::BindingReady);
    exchange.on_response(Ok(Message::StatusReport(StatusReport::success())));

    assert_eq!(exchange.on_binding_event(&BindingEvent::BindingFailed("late".into())), ExchangeStep::Wait);
    assert_eq!(exchange.on_response(Err(UpdateError::Timeout)), ExchangeStep::Wait);
    assert_eq!(exchange.fail(UpdateError::Timeout), ExchangeStep::Wait);
    assert_eq!(exchange.state(), ExchangeState::Complete);
}

#[test]
fn response_before_binding_is_ignored() {
    let mut exchange = started();
    assert_eq!(exchange.on_response(Ok(Message::StatusReport(StatusReport::success()))), ExchangeStep::Wait);
    assert_eq!(exchange.state(), ExchangeState::Pending);
}

#[test]
fn timeout_fails_a_live_exchange() {
    let mut exchange = started();
    exchange.on_binding_event(&BindingEvent::BindingReady);
    assert_eq!(exchange.fail(UpdateError::Timeout), ExchangeStep::Release);
    assert_eq!(exchange.into_outcome(), Err(UpdateError::Timeout));
}

#[test]
fn unfinished_exchange_has_no_outcome() {
    let exchange = started();
    assert_eq!(exchange.outcome(), None);
    assert!(matches!(exchange.into_outcome(), Err(UpdateError::Protocol(_))));
}

#[test]
fn key_display() {
    assert_eq!(key().to_string(), format!("self/{}/0/1@v1", ProfileId::new(0, 0x0016)));
}
