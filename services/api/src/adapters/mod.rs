pub mod chat_log;
pub mod completion_llm;

pub use chat_log::PgChatLogAdapter;
pub use completion_llm::{build_provider_client, OpenAiCompletionAdapter};
