//! Execution context injected into the client factory.
//!
//! The factory never probes a runtime global to decide where it is running;
//! callers state explicitly whether they are client- or server-side. That
//! keeps the construction guards testable without a real host environment.

use std::env;

/// Environment variable selecting the execution mode.
pub const MODE_VAR: &str = "APP_ENV";

/// Where the code is executing, from the backend's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// Browser-like host; the only place the client may be constructed.
    Client,
    /// Server-side host.
    Server,
}

/// Development/production switch gating diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Verbose diagnostics enabled.
    Development,
    /// Only failures are reported.
    Production,
}

impl Mode {
    /// Read the mode from `APP_ENV`. Anything other than `development`,
    /// including an unset variable, counts as production.
    pub fn from_env() -> Self {
        Self::from_value(env::var(MODE_VAR).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("development") => Mode::Development,
            _ => Mode::Production,
        }
    }
}

/// Runtime plus mode, passed into every factory entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Client- or server-side host.
    pub runtime: Runtime,
    /// Development or production build.
    pub mode: Mode,
}

impl ExecutionContext {
    /// Context with both parts given explicitly.
    pub const fn new(runtime: Runtime, mode: Mode) -> Self {
        Self { runtime, mode }
    }

    /// Context for a browser-like host, mode taken from the environment.
    pub fn client() -> Self {
        Self::new(Runtime::Client, Mode::from_env())
    }

    /// Context for a server-side host, mode taken from the environment.
    pub fn server() -> Self {
        Self::new(Runtime::Server, Mode::from_env())
    }
}
