//! Generation provider integration.
//!
//! Providers are local CLIs (`claude`, `gemini`, `copilot`) that read a prompt
//! on stdin and print a response.

pub mod registry;
pub mod retry;
pub mod subprocess;

pub use registry::{OutputFormat, ProviderRegistry, ProviderSpec};
pub use retry::{ProviderExecutor, SubprocessExecutor, generate_with_retry, retry_with_backoff};
pub use subprocess::{ProviderCommand, check_installed, get_timeout, run_provider};
