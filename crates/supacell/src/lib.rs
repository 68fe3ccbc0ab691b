//! Environment-driven bootstrap for a shared Supabase client.
//!
//! Two pieces: [`config`] reads and validates the `NEXT_PUBLIC_SUPABASE_*`
//! environment variables, and [`client`] guards construction of the single
//! process-wide [`SupabaseClient`]. Construction is allowed only from a
//! client-side [`ExecutionContext`], only with a configuration that passes
//! validation, and only once; later calls get the cached handle back.
//!
//! Loading is deliberately lenient: missing variables default to the empty
//! string and are rejected at validation time, not at load time. Diagnostic
//! output goes through the [`Diagnostics`] trait so the checks themselves
//! stay pure; the default sink forwards to `tracing` and never emits raw
//! secret values, only boolean flags and short prefixes.
//!
//! The actual transport is `reqwest`; nothing in this crate speaks the
//! backend protocol itself.

pub mod client;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;

pub use client::{
    ClientCell, ClientOptions, SupabaseClient, create_client, is_configured, is_configured_with,
};
pub use config::{
    AppConfig, LoadSummary, ValidationReport, load_config, process_config, validate_config,
};
pub use context::{ExecutionContext, Mode, Runtime};
pub use diagnostics::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::Error;
