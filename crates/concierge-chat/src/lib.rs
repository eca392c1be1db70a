//! Conversational core of Concierge.
//!
//! Provides language detection, bounded per-user sessions, grounding prompt
//! assembly, language-model access and the orchestrator that runs one turn.

pub mod error;
pub mod language;
pub mod oracle;
pub mod orchestrator;
pub mod prompt;
pub mod response;
pub mod session;

pub use error::{ChatError, OracleError};
pub use language::classify;
pub use oracle::{CompletionRequest, LanguageModel, OpenAiChatModel};
pub use orchestrator::{ChatOrchestrator, Reply};
pub use prompt::{PromptAssembler, PromptContext};
pub use response::ResponseGenerator;
pub use session::{SessionHandle, SessionState, SessionStore};
