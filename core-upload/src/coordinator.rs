//! Upload Coordinator
//!
//! Presigned direct-to-storage uploads. The coordinator asks the backend for
//! an upload ticket through the request engine, enforces the ticket's byte
//! limit locally, then PUTs the payload straight at the storage endpoint
//! through the raw transport. The transfer carries exactly the headers the
//! ticket prescribes; engine defaults (bearer token included) would break a
//! presigned signature.

use bridge_traits::http::{HttpMethod, HttpRequest, HttpTransport};
use bytes::Bytes;
use core_api::descriptor::RequestDescriptor;
use core_api::engine::RequestEngine;
use core_api::error::{ApiError, Result};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What is being uploaded, for the presign request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadKind {
    Avatar,
    ServiceImage,
}

/// The resource an upload attaches to.
#[derive(Debug, Clone, Copy)]
pub struct UploadResource {
    pub kind: UploadKind,
    pub id: i64,
}

impl UploadResource {
    pub fn avatar(user_id: i64) -> Self {
        Self {
            kind: UploadKind::Avatar,
            id: user_id,
        }
    }

    pub fn service_image(service_id: i64) -> Self {
        Self {
            kind: UploadKind::ServiceImage,
            id: service_id,
        }
    }
}

/// A single-use grant from the backend: where to PUT the bytes, under what
/// headers, up to what size, and the storage key the object will live at.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub url: String,
    pub key: String,
    #[serde(default)]
    pub required_headers: HashMap<String, String>,
    pub max_bytes: u64,
}

/// Outcome of a completed upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Storage key to reference the object in later API calls.
    pub storage_key: String,
}

/// Coordinates the presign → validate → transfer sequence.
#[derive(Clone)]
pub struct UploadCoordinator {
    engine: Arc<RequestEngine>,
    transport: Arc<dyn HttpTransport>,
    transfer_timeout: Duration,
}

impl UploadCoordinator {
    pub fn new(engine: Arc<RequestEngine>) -> Self {
        let transport = engine.transport();
        Self {
            engine,
            transport,
            transfer_timeout: Duration::from_secs(60),
        }
    }

    /// Override the transfer-leg timeout (the presign call uses the engine's
    /// own timeout).
    pub fn transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    /// Upload a payload under a fresh presigned ticket.
    ///
    /// Steps: obtain a ticket, reject oversized payloads before any transfer,
    /// PUT the bytes to the ticket URL, return the storage key.
    ///
    /// # Errors
    ///
    /// [`ApiError::SizeLimit`] when the payload exceeds the ticket's limit
    /// (no transfer is attempted), [`ApiError::TransferFailure`] when storage
    /// rejects the PUT, or any engine error from the presign call.
    pub async fn upload_with_presign(
        &self,
        resource: UploadResource,
        payload: Bytes,
        mime_type: &str,
    ) -> Result<UploadReceipt> {
        let ticket = self.sign(resource, mime_type).await?;

        let actual_bytes = payload.len() as u64;
        if actual_bytes > ticket.max_bytes {
            warn!(
                max_bytes = ticket.max_bytes,
                actual_bytes, "Payload exceeds ticket limit; refusing transfer"
            );
            return Err(ApiError::SizeLimit {
                max_bytes: ticket.max_bytes,
                actual_bytes,
            });
        }

        self.transfer(&ticket, payload).await?;
        info!(key = %ticket.key, bytes = actual_bytes, "Upload complete");

        Ok(UploadReceipt {
            storage_key: ticket.key,
        })
    }

    /// Upload and then notify the backend that the object is in place.
    ///
    /// The confirmation is a normal engine call, so the storage key is bound
    /// to the resource server-side before anything references it.
    pub async fn upload_and_confirm(
        &self,
        resource: UploadResource,
        payload: Bytes,
        mime_type: &str,
    ) -> Result<UploadReceipt> {
        let receipt = self.upload_with_presign(resource, payload, mime_type).await?;

        let descriptor = RequestDescriptor::post("/uploads/complete")
            .json(json!({
                "resource": resource.kind,
                "id": resource.id,
                "key": receipt.storage_key,
            }))
            .tag("uploads.complete");
        self.engine.execute(&descriptor).await?;

        Ok(receipt)
    }

    async fn sign(&self, resource: UploadResource, mime_type: &str) -> Result<UploadTicket> {
        let descriptor = RequestDescriptor::post("/uploads/presign")
            .json(json!({
                "resource": resource.kind,
                "id": resource.id,
                "mimeType": mime_type,
            }))
            .tag("uploads.presign");

        self.engine.execute_as(&descriptor).await
    }

    /// PUT the payload at the ticket URL with exactly the ticket's headers.
    async fn transfer(&self, ticket: &UploadTicket, payload: Bytes) -> Result<()> {
        debug!(url = %ticket.url, "Transferring payload to storage");

        let mut request = HttpRequest::new(HttpMethod::Put, &ticket.url)
            .body(payload)
            .timeout(self.transfer_timeout);
        for (key, value) in &ticket.required_headers {
            request = request.header(key, value);
        }

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport {
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(ApiError::TransferFailure {
                status: response.status,
                message: {
                    let text = response.text();
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        "storage rejected the transfer".to_string()
                    } else {
                        trimmed.chars().take(160).collect()
                    }
                },
            });
        }

        Ok(())
    }
}
