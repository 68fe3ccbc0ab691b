//! Observer interface for diagnostic events.
//!
//! Validation and construction stay pure; anything a human might want to
//! see goes through this sink. The default sink forwards to `tracing` and
//! applies the runtime/mode gating, so verbose output never shows up in a
//! production build and raw secret values are never emitted at all.

use crate::config::{LoadSummary, ValidationReport};
use crate::context::{ExecutionContext, Mode, Runtime};
use crate::error::Error;

/// Receiver for diagnostic events emitted by the config loader and the
/// client factory. All methods default to no-ops.
pub trait Diagnostics {
    /// Configuration was read from the environment.
    fn config_loaded(&self, summary: &LoadSummary) {
        let _ = summary;
    }

    /// A validation pass failed; the report carries only booleans.
    fn validation_failed(&self, report: &ValidationReport) {
        let _ = report;
    }

    /// The cached client instance was handed out again.
    fn reusing_client(&self) {}

    /// A new client is about to be constructed.
    fn creating_client(&self, url_prefix: &str) {
        let _ = url_prefix;
    }

    /// Construction finished and the instance was cached.
    fn client_created(&self) {}

    /// Validation or construction failed fatally.
    fn client_failed(&self, error: &Error) {
        let _ = error;
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// Default sink: forwards events to `tracing`.
///
/// Lifecycle chatter (load summaries, client creation/reuse) is only
/// emitted for a client-side development context; validation failures are
/// emitted for any client-side context; fatal errors always.
#[derive(Debug, Clone, Copy)]
pub struct TracingDiagnostics {
    context: ExecutionContext,
}

impl TracingDiagnostics {
    /// Sink gated by the given context.
    pub const fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    fn verbose(&self) -> bool {
        self.context.runtime == Runtime::Client && self.context.mode == Mode::Development
    }

    fn client_side(&self) -> bool {
        self.context.runtime == Runtime::Client
    }
}

impl Diagnostics for TracingDiagnostics {
    fn config_loaded(&self, summary: &LoadSummary) {
        if self.verbose() {
            tracing::debug!(
                has_url = summary.has_url,
                has_key = summary.has_key,
                url_prefix = %summary.url_prefix,
                key_prefix = %summary.key_prefix,
                "environment configuration loaded"
            );
        }
    }

    fn validation_failed(&self, report: &ValidationReport) {
        if self.client_side() {
            tracing::error!(
                has_url = report.has_url,
                has_key = report.has_key,
                url_is_https = report.url_is_https,
                url_is_placeholder = report.url_is_placeholder,
                key_is_placeholder = report.key_is_placeholder,
                "configuration validation failed"
            );
        }
    }

    fn reusing_client(&self) {
        if self.verbose() {
            tracing::debug!("returning existing Supabase client instance");
        }
    }

    fn creating_client(&self, url_prefix: &str) {
        if self.verbose() {
            tracing::debug!(%url_prefix, "creating new Supabase client instance");
        }
    }

    fn client_created(&self) {
        if self.verbose() {
            tracing::debug!("Supabase client created successfully");
        }
    }

    fn client_failed(&self, error: &Error) {
        tracing::error!("failed to set up Supabase client: {error}");
    }
}
