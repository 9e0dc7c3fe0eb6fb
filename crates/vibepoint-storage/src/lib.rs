//! Pre-signed object storage transfers.
//!
//! This crate provides:
//! - Streaming PUT uploads to pre-signed URLs with byte progress
//! - Public URL derivation from a signed write URL
//! - The [`ObjectUploader`] seam used by the upload pipeline

pub mod client;
pub mod error;

pub use client::{is_video_path, public_url, ObjectUploader, PresignedUploader, ProgressFn, SIGNED_CONTENT_TYPE};
pub use error::{StorageError, StorageResult};
