//! Form payload collection and document storage.
//!
//! The endpoints that carry supporting documents (contracts, payments,
//! buildings, units, invoices) accept either `multipart/form-data` from the
//! browser or plain JSON from API clients. Both shapes collapse into a
//! [`FormPayload`]: a flat field map plus the manifest of files written to
//! the uploads directory.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::Multipart;
use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::types::FormField;
use crate::AppState;

/// One file persisted under the uploads directory.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Form field the file arrived under (e.g. `identityDocument`).
    pub field_name: String,
    /// Generated on-disk filename, recorded in the owning row.
    pub stored_name: String,
}

#[derive(Debug, Default)]
pub struct FormPayload {
    fields: HashMap<String, String>,
    pub documents: Vec<StoredDocument>,
}

impl FormPayload {
    pub fn field(&self, name: &str) -> FormField {
        match self.fields.get(name) {
            Some(value) => FormField::new(value.clone()),
            None => FormField::empty(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_insert_with(|| value.into());
    }

    /// First stored file for a field, if any.
    pub fn document(&self, field_name: &str) -> Option<&str> {
        self.documents
            .iter()
            .find(|d| d.field_name == field_name)
            .map(|d| d.stored_name.as_str())
    }

    /// All stored files for a field, comma-joined, or None when absent.
    pub fn documents_for(&self, field_name: &str) -> Option<String> {
        let names: Vec<&str> = self
            .documents
            .iter()
            .filter(|d| d.field_name == field_name)
            .map(|d| d.stored_name.as_str())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names.join(","))
        }
    }

    /// Every stored file, comma-joined. Empty string when nothing was
    /// uploaded, matching what list views expect in the documents column.
    pub fn manifest(&self) -> String {
        self.documents
            .iter()
            .map(|d| d.stored_name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn from_json(map: Map<String, Value>) -> Self {
        let mut payload = FormPayload::default();
        for (key, value) in map {
            if let Some(text) = FormField::from_value(Some(value)).into_raw() {
                payload.fields.insert(key, text);
            }
        }
        payload
    }
}

/// Read the request body into a [`FormPayload`], persisting any multipart
/// file parts into the uploads directory.
pub async fn read_payload(state: &AppState, request: Request) -> Result<FormPayload, ApiError> {
    let content_type = request
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart request: {}", e)))?;
        return collect_multipart(state, multipart).await;
    }

    // Everything else is treated as JSON; an empty body is an empty payload.
    let bytes = axum::body::to_bytes(
        request.into_body(),
        crate::config::config().uploads.max_request_size_bytes,
    )
    .await
    .map_err(|e| ApiError::bad_request(format!("failed to read request body: {}", e)))?;

    if bytes.is_empty() {
        return Ok(FormPayload::default());
    }

    let map: Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {}", e)))?;
    Ok(FormPayload::from_json(map))
}

async fn collect_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<FormPayload, ApiError> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart field: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(original_name) = field.file_name().map(str::to_string) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read upload: {}", e)))?;
            if bytes.is_empty() {
                continue;
            }
            let stored_name = store_document(state, &name, &original_name, &bytes).await?;
            payload.documents.push(StoredDocument {
                field_name: name,
                stored_name,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("invalid form field: {}", e)))?;
            // Repeated fields keep the first submitted value
            payload.fields.entry(name).or_insert(text);
        }
    }

    Ok(payload)
}

/// Write a document under a collision-free generated name, keeping the
/// original extension for content-type sniffing on download.
async fn store_document(
    state: &AppState,
    field_name: &str,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, ApiError> {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let stored_name = format!("{}-{}{}", field_name, Uuid::new_v4().simple(), extension);

    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|e| ApiError::internal(format!("failed to create uploads dir: {}", e)))?;
    tokio::fs::write(state.uploads_dir.join(&stored_name), bytes)
        .await
        .map_err(|e| ApiError::internal(format!("failed to store upload: {}", e)))?;

    tracing::info!("Stored upload {} ({} bytes)", stored_name, bytes.len());
    Ok(stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_from(value: Value) -> FormPayload {
        match value {
            Value::Object(map) => FormPayload::from_json(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn json_fields_normalize_to_strings() {
        let payload = payload_from(json!({
            "clientName": "Ali",
            "rentValue": 5000,
            "notes": null
        }));

        assert_eq!(payload.field("clientName").text(), Some("Ali"));
        assert_eq!(payload.field("rentValue").number(), Some(5000.0));
        assert!(!payload.field("notes").is_present());
        assert!(!payload.field("missing").is_present());
    }

    #[test]
    fn manifest_is_empty_without_uploads() {
        let payload = FormPayload::default();
        assert_eq!(payload.manifest(), "");
        assert!(payload.documents_for("additionalDocuments").is_none());
    }
}
