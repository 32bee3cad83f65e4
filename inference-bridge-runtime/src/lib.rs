//! Inference Bridge Runtime
//!
//! The asynchronous half of the bridge: a pluggable HTTP transport, the
//! per-call context that carries cancellation and diagnostics, debug capture
//! around each completion, and delivery of streamed fragments.

pub mod completion;
pub mod context;
pub mod debug;
pub mod stream;
pub mod transport;

pub use completion::{FailedCompletion, ProviderCall, RawResponse, run_completion};
pub use context::CallContext;
pub use debug::{CompletionDebugger, CompletionSpan, DebugConfig, HttpCompletionDebugger, NoopDebugger};
pub use stream::{StreamEmitter, deliver_stream};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};

// Re-export core types for convenience
pub use inference_bridge_core;
