//! Presigned upload coordination for the marketplace client.
//!
//! The backend never proxies file bytes; it hands out single-use presigned
//! tickets and the client transfers directly to storage. This crate owns
//! that sequence: presign through the request engine, local size gate, raw
//! PUT through the transport, storage key back to the caller.

pub mod coordinator;

pub use coordinator::{UploadCoordinator, UploadKind, UploadReceipt, UploadResource, UploadTicket};
