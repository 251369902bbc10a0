//! Publisher side: applies update requests and answers view requests.

use crate::catalog::{lock_store, SharedStore, TraitCatalog, TraitInstanceInfo};
use crate::error::{UpdateError, UpdateResult};
use crate::protocol::{
    DataElement, DataPath, Message, StatusCode, StatusReport, UpdateRequest, ViewRequest, ViewResponse,
};
use std::sync::Arc;
use tdm_schema::data::{decode_property, encode_property};
use tdm_schema::{SchemaError, TraitSchemaDirectory, TraitSchemaEngine};
use tdm_tlv::{Tag, TlvValue, TlvWriter};
use tdm_types::PropertyHandle;
use tracing::{debug, info, warn};

/// A failed element: the status to report and why.
type Refusal = (StatusCode, String);

fn status_for(err: &SchemaError) -> StatusCode {
    match err {
        SchemaError::UnsupportedVersion { .. } => StatusCode::UnsupportedVersion,
        SchemaError::HandleNotFound { .. } | SchemaError::TagNotFound { .. } | SchemaError::NameNotFound { .. } => {
            StatusCode::InvalidPath
        }
        SchemaError::NotNullable { .. }
        | SchemaError::TypeMismatch { .. }
        | SchemaError::MissingProperty { .. }
        | SchemaError::Data(_) => StatusCode::InvalidValue,
        SchemaError::ProfileNotRegistered(_) => StatusCode::UnknownTrait,
        _ => StatusCode::InternalError,
    }
}

fn refuse(err: SchemaError) -> Refusal {
    (status_for(&err), err.to_string())
}

/// Serves the trait instances of a catalog.
pub struct UpdateServer {
    directory: Arc<TraitSchemaDirectory>,
    catalog: Arc<dyn TraitCatalog>,
}

impl UpdateServer {
    pub fn new(directory: Arc<TraitSchemaDirectory>, catalog: Arc<dyn TraitCatalog>) -> Self {
        Self { directory, catalog }
    }

    /// Answers one request.
    pub fn handle(&self, message: Message) -> Message {
        match message {
            Message::UpdateRequest(request) => Message::StatusReport(self.apply_update(&request)),
            Message::ViewRequest(request) => match self.view(&request) {
                Ok(response) => Message::ViewResponse(response),
                Err(report) => Message::StatusReport(report),
            },
            other => {
                warn!(message_type = ?other.message_type(), "unexpected message");
                Message::StatusReport(StatusReport::failure(
                    StatusCode::InternalError,
                    None,
                    format!("cannot serve {:?}", other.message_type()),
                ))
            }
        }
    }

    /// Answers one encoded request. A request that does not decode gets an
    /// `InvalidValue` status report.
    pub fn handle_bytes(&self, request: &[u8]) -> UpdateResult<Vec<u8>> {
        let response = match Message::decode(request) {
            Ok(message) => self.handle(message),
            Err(e) => {
                warn!(error = %e, "undecodable request");
                Message::StatusReport(StatusReport::failure(StatusCode::InvalidValue, None, e.to_string()))
            }
        };
        response.encode()
    }

    /// Applies each element in order and stops at the first failure.
    /// Elements before the failing one stay applied.
    pub fn apply_update(&self, request: &UpdateRequest) -> StatusReport {
        if let Some(argument) = &request.argument {
            debug!(argument = %argument.type_name(), "update carries an argument");
        }
        for (index, element) in request.elements.iter().enumerate() {
            if let Err((code, reason)) = self.apply_element(element) {
                warn!(path = %element.path, index, code = %code, reason = %reason, "update element refused");
                let index = u32::try_from(index).ok();
                return StatusReport::failure(code, index, reason);
            }
        }
        info!(elements = request.elements.len(), "update applied");
        StatusReport::success()
    }

    /// Reads every requested path. Fails as a whole on the first bad path.
    pub fn view(&self, request: &ViewRequest) -> Result<ViewResponse, StatusReport> {
        let mut elements = Vec::with_capacity(request.paths.len());
        for (index, path) in request.paths.iter().enumerate() {
            match self.read_element(path) {
                Ok(element) => elements.push(element),
                Err((code, reason)) => {
                    warn!(path = %path, code = %code, reason = %reason, "view refused");
                    return Err(StatusReport::failure(code, u32::try_from(index).ok(), reason));
                }
            }
        }
        debug!(elements = elements.len(), "view served");
        Ok(ViewResponse { elements })
    }

    // ── Internal ─────────────────────────────────────────────────

    fn target(&self, path: &DataPath) -> Result<(Arc<TraitSchemaEngine>, SharedStore, PropertyHandle), Refusal> {
        let info = TraitInstanceInfo {
            profile_id: path.profile_id,
            instance_id: path.instance_id,
            resource_id: path.resource_id,
        };
        let unknown = || (StatusCode::UnknownTrait, format!("no trait instance at {path}"));
        let handle = self.catalog.find(&info).ok_or_else(unknown)?;
        let store = self.catalog.store(handle).ok_or_else(unknown)?;
        let schema = self.directory.require(path.profile_id).map_err(refuse)?;
        let property = schema
            .resolve_tag_path_at(path.schema_version, &path.tags)
            .map_err(refuse)?;
        Ok((schema, store, property))
    }

    fn apply_element(&self, element: &DataElement) -> Result<(), Refusal> {
        let (schema, store, property) = self.target(&element.path)?;
        let mut store = lock_store(&store).map_err(internal)?;
        decode_property(&schema, element.path.schema_version, &mut *store, property, &element.data)
            .map_err(refuse)?;
        let version = element
            .data_version
            .unwrap_or_else(|| store.data_version().wrapping_add(1));
        store.set_data_version(version);
        debug!(path = %element.path, property = %property, version, "applied update element");
        Ok(())
    }

    fn read_element(&self, path: &DataPath) -> Result<DataElement, Refusal> {
        let (schema, store, property) = self.target(path)?;
        let store = lock_store(&store).map_err(internal)?;
        let mut writer = TlvWriter::new();
        encode_property(&schema, &*store, property, &mut writer, Tag::Anonymous).map_err(refuse)?;
        if writer.is_empty() {
            return Err((StatusCode::InvalidPath, format!("no data at {path}")));
        }
        let encoded = writer.finish().map_err(|e| internal(e.into()))?;
        let (_, data) = TlvValue::decode(&encoded).map_err(|e| internal(e.into()))?;
        Ok(DataElement {
            path: path.clone(),
            data_version: Some(store.data_version()),
            data,
        })
    }
}

fn internal(err: UpdateError) -> Refusal {
    (StatusCode::InternalError, err.to_string())
}
