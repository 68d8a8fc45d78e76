//! Upstream inference provider integration
//!
//! The relay forwards audio to a hosted speech-to-text endpoint through the
//! `Transcriber` trait; `HostedWhisper` is the production implementation.

pub mod client;

pub use client::HostedWhisper;

use anyhow::Result;

/// Speech-to-text client trait
///
/// The handler only depends on this seam, so tests can substitute stub
/// implementations for the hosted endpoint.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio clip, returning the recognized text
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}
