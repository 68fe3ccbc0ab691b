//! Lazily-constructed shared handle to the Supabase backend.
//!
//! The handle itself is a thin wrapper over `reqwest`: the anon key is
//! installed as default headers and the fixed options are carried along for
//! the session/realtime layers. Construction is guarded three ways: it must
//! happen in a client-side runtime, it requires a configuration that passes
//! validation, and it happens at most once per [`ClientCell`].

use std::sync::Arc;

use once_cell::sync::OnceCell;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::config::{self, AppConfig, URL_PREFIX_LEN, truncate_chars};
use crate::context::{ExecutionContext, Runtime};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::Error;

/// Fixed options applied to every client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Keep the auth session across host restarts.
    pub persist_session: bool,
    /// Refresh the access token automatically before it expires.
    pub auto_refresh_token: bool,
    /// Cap on realtime events per second.
    pub events_per_second: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
            auto_refresh_token: true,
            events_per_second: 10,
        }
    }
}

/// Opaque handle to the backend service.
///
/// At most one instance exists per process; it lives until process exit.
#[derive(Debug)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
}

impl SupabaseClient {
    /// Build a handle from a validated configuration.
    ///
    /// The anon key goes into the default `apikey` and `Authorization`
    /// headers, marked sensitive so it never shows up in header debug
    /// output. Building the underlying HTTP client can fail; that failure
    /// is surfaced as [`Error::Construction`] and is not retried here.
    pub fn connect(config: &AppConfig, options: ClientOptions) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&config.supabase_anon_key)
            .map_err(|e| Error::Construction(Box::new(e)))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.supabase_anon_key))
            .map_err(|e| Error::Construction(Box::new(e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Construction(Box::new(e)))?;

        Ok(Self {
            http,
            base_url: config.supabase_url.trim_end_matches('/').to_owned(),
            options,
        })
    }

    /// Underlying HTTP client, pre-authenticated with the anon key.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Project base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Options this handle was constructed with.
    pub fn options(&self) -> ClientOptions {
        self.options
    }

    /// REST endpoint under the project base URL.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url)
    }

    /// Auth endpoint under the project base URL.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base_url)
    }
}

/// Lazily-initialized singleton holder for the shared client.
///
/// The once-cells provide the mutual exclusion around the
/// check → validate → construct → store sequence, so the construct step
/// succeeds at most once per cell even under concurrent callers. The
/// validation memo outlives a failed construction attempt: configuration is
/// immutable for the process lifetime, so a retry skips straight to
/// construction.
#[derive(Debug, Default)]
pub struct ClientCell {
    client: OnceCell<Arc<SupabaseClient>>,
    validated: OnceCell<()>,
}

impl ClientCell {
    /// Empty cell; nothing validated, nothing constructed.
    pub const fn new() -> Self {
        Self {
            client: OnceCell::new(),
            validated: OnceCell::new(),
        }
    }

    /// Cached instance, if one was constructed.
    pub fn get(&self) -> Option<Arc<SupabaseClient>> {
        self.client.get().cloned()
    }

    /// Return the shared client, constructing it on first use.
    ///
    /// Fails with [`Error::WrongRuntime`] without touching the cell when
    /// called from a server-side runtime, and with [`Error::ConfigInvalid`]
    /// before any construction when the configuration does not validate.
    pub fn get_or_create(
        &self,
        config: &AppConfig,
        context: &ExecutionContext,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Arc<SupabaseClient>, Error> {
        self.get_or_create_with(config, context, diagnostics, |cfg| {
            SupabaseClient::connect(cfg, ClientOptions::default())
        })
    }

    fn get_or_create_with(
        &self,
        config: &AppConfig,
        context: &ExecutionContext,
        diagnostics: &dyn Diagnostics,
        construct: impl FnOnce(&AppConfig) -> Result<SupabaseClient, Error>,
    ) -> Result<Arc<SupabaseClient>, Error> {
        // Context is checked ahead of the cache: a server-side caller is
        // refused even when an instance already exists.
        if context.runtime != Runtime::Client {
            return Err(Error::WrongRuntime);
        }

        if let Some(existing) = self.client.get() {
            diagnostics.reusing_client();
            return Ok(existing.clone());
        }

        if self.validated.get().is_none() {
            let report = config.validate();
            if !report.is_valid() {
                diagnostics.validation_failed(&report);
                let error = Error::ConfigInvalid;
                diagnostics.client_failed(&error);
                return Err(error);
            }
            let _ = self.validated.set(());
        }

        diagnostics.creating_client(truncate_chars(&config.supabase_url, URL_PREFIX_LEN));

        match self.client.get_or_try_init(|| construct(config).map(Arc::new)) {
            Ok(client) => {
                diagnostics.client_created();
                Ok(client.clone())
            }
            Err(error) => {
                diagnostics.client_failed(&error);
                Err(error)
            }
        }
    }
}

static SHARED: ClientCell = ClientCell::new();

/// Return the process-wide shared client, constructing it on first call
/// from the process-loaded configuration.
pub fn create_client(context: &ExecutionContext) -> Result<Arc<SupabaseClient>, Error> {
    let diagnostics = TracingDiagnostics::new(*context);
    SHARED.get_or_create(config::process_config(), context, &diagnostics)
}

/// Check whether the process-loaded configuration would pass validation,
/// reporting which check failed through the default diagnostics sink.
pub fn is_configured(context: &ExecutionContext) -> bool {
    is_configured_with(config::process_config(), &TracingDiagnostics::new(*context))
}

/// [`is_configured`] against an explicit config and diagnostics sink.
pub fn is_configured_with(config: &AppConfig, diagnostics: &dyn Diagnostics) -> bool {
    let report = config.validate();
    if !report.is_valid() {
        diagnostics.validation_failed(&report);
    }
    report.is_valid()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::context::Mode;
    use crate::diagnostics::NoopDiagnostics;

    fn valid_config() -> AppConfig {
        AppConfig {
            supabase_url: "https://abc.supabase.co".to_string(),
            supabase_anon_key: "realkey123".to_string(),
        }
    }

    fn client_context() -> ExecutionContext {
        ExecutionContext::new(Runtime::Client, Mode::Production)
    }

    fn server_context() -> ExecutionContext {
        ExecutionContext::new(Runtime::Server, Mode::Production)
    }

    #[test]
    fn test_second_call_returns_cached_instance() {
        let cell = ClientCell::new();
        let ctx = client_context();
        let first = cell
            .get_or_create(&valid_config(), &ctx, &NoopDiagnostics)
            .unwrap();
        let second = cell
            .get_or_create(&valid_config(), &ctx, &NoopDiagnostics)
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_construction_runs_at_most_once() {
        let cell = ClientCell::new();
        let ctx = client_context();
        let cfg = valid_config();
        let constructions = AtomicUsize::new(0);

        for _ in 0..3 {
            cell.get_or_create_with(&cfg, &ctx, &NoopDiagnostics, |cfg| {
                constructions.fetch_add(1, Ordering::SeqCst);
                SupabaseClient::connect(cfg, ClientOptions::default())
            })
            .unwrap();
        }

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_config_fails_before_construction() {
        let cell = ClientCell::new();
        let ctx = client_context();
        let cfg = AppConfig {
            supabase_url: String::new(),
            supabase_anon_key: "realkey123".to_string(),
        };
        let constructions = AtomicUsize::new(0);

        let result = cell.get_or_create_with(&cfg, &ctx, &NoopDiagnostics, |cfg| {
            constructions.fetch_add(1, Ordering::SeqCst);
            SupabaseClient::connect(cfg, ClientOptions::default())
        });

        assert!(matches!(result, Err(Error::ConfigInvalid)));
        assert_eq!(constructions.load(Ordering::SeqCst), 0);
        assert!(cell.get().is_none());
    }

    #[test]
    fn test_server_runtime_fails_without_touching_cell() {
        let cell = ClientCell::new();
        let cfg = valid_config();
        let constructions = AtomicUsize::new(0);

        let result = cell.get_or_create_with(&cfg, &server_context(), &NoopDiagnostics, |cfg| {
            constructions.fetch_add(1, Ordering::SeqCst);
            SupabaseClient::connect(cfg, ClientOptions::default())
        });

        assert!(matches!(result, Err(Error::WrongRuntime)));
        assert_eq!(constructions.load(Ordering::SeqCst), 0);
        assert!(cell.client.get().is_none());
        assert!(cell.validated.get().is_none());
    }

    #[test]
    fn test_cached_instance_still_refused_server_side() {
        let cell = ClientCell::new();
        cell.get_or_create(&valid_config(), &client_context(), &NoopDiagnostics)
            .unwrap();

        let result = cell.get_or_create(&valid_config(), &server_context(), &NoopDiagnostics);
        assert!(matches!(result, Err(Error::WrongRuntime)));
    }

    #[test]
    fn test_validation_memo_survives_failed_construction() {
        let cell = ClientCell::new();
        let ctx = client_context();
        let cfg = valid_config();
        let retries = AtomicUsize::new(0);

        let failed = cell.get_or_create_with(&cfg, &ctx, &NoopDiagnostics, |_| {
            Err(Error::Construction("builder exploded".into()))
        });
        assert!(matches!(failed, Err(Error::Construction(_))));
        assert!(cell.get().is_none());
        assert!(cell.validated.get().is_some());

        // The retry skips re-validation and goes straight to construction.
        let retried = cell.get_or_create_with(&cfg, &ctx, &NoopDiagnostics, |cfg| {
            retries.fetch_add(1, Ordering::SeqCst);
            SupabaseClient::connect(cfg, ClientOptions::default())
        });
        assert!(retried.is_ok());
        assert_eq!(retries.load(Ordering::SeqCst), 1);
        assert!(cell.get().is_some());
    }

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert!(options.persist_session);
        assert!(options.auto_refresh_token);
        assert_eq!(options.events_per_second, 10);
    }

    #[test]
    fn test_connect_builds_handle_and_trims_url() {
        let cfg = AppConfig {
            supabase_url: "https://abc.supabase.co/".to_string(),
            supabase_anon_key: "realkey123".to_string(),
        };
        let client = SupabaseClient::connect(&cfg, ClientOptions::default()).unwrap();
        assert_eq!(client.base_url(), "https://abc.supabase.co");
        assert_eq!(client.rest_url(), "https://abc.supabase.co/rest/v1");
        assert_eq!(client.auth_url(), "https://abc.supabase.co/auth/v1");
        assert_eq!(client.options(), ClientOptions::default());
    }

    #[test]
    fn test_connect_rejects_unprintable_key() {
        let cfg = AppConfig {
            supabase_url: "https://abc.supabase.co".to_string(),
            supabase_anon_key: "bad\nkey".to_string(),
        };
        let result = SupabaseClient::connect(&cfg, ClientOptions::default());
        assert!(matches!(result, Err(Error::Construction(_))));
    }

    #[test]
    fn test_is_configured_with() {
        assert!(is_configured_with(&valid_config(), &NoopDiagnostics));
        let cfg = AppConfig {
            supabase_url: "http://abc.supabase.co".to_string(),
            supabase_anon_key: "realkey123".to_string(),
        };
        assert!(!is_configured_with(&cfg, &NoopDiagnostics));
    }
}
