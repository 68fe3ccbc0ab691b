//! Error types surfaced by the configuration checks and the client factory.

use thiserror::Error;

/// Failures raised while validating configuration or constructing the
/// shared Supabase client. None of these are retried; the caller is
/// expected to fix the environment (or the call site) and start over.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction was attempted from a server-side execution context.
    #[error("the Supabase client can only be created in a client-side runtime")]
    WrongRuntime,

    /// The loaded configuration failed validation.
    #[error(
        "missing Supabase configuration. Environment variables \
         NEXT_PUBLIC_SUPABASE_URL and NEXT_PUBLIC_SUPABASE_ANON_KEY must be \
         set. If you just updated your .env file, you need to restart the \
         application for the new values to be picked up."
    )]
    ConfigInvalid,

    /// The underlying HTTP client could not be built.
    #[error("failed to initialize Supabase client: {0}")]
    Construction(#[source] Box<dyn std::error::Error + Send + Sync>),
}
