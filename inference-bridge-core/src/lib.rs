// Provider-agnostic completion model plus the policy that adapts it to each
// vendor. Everything in this crate is synchronous and network-free.

pub mod chat;
pub mod content;
pub mod empty;
pub mod error;
pub mod message;
pub mod model;
pub mod provider;
pub mod secret;
pub mod tool;

// Re-export the main types for convenient usage
pub use chat::{CompletionRequest, CompletionResponse, StreamConfig, StreamEvent};
pub use content::{ContentItem, InputOutputContent, ReasoningContent, Role};
pub use empty::is_turn_empty;
pub use error::{Error, Result, ToolResolutionError};
pub use message::{InputTurn, OutputTurn};
pub use model::{ModelParam, ReasoningLevel, ReasoningParam, ReasoningType, Usage};
pub use provider::{ProviderParam, ProviderSdkType};
pub use secret::Secret;
pub use tool::{ToolCall, ToolChoice, ToolOutput, ToolPolicy, ToolPolicyMode};
