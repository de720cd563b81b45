pub mod diagram;
pub mod domain;
pub mod ports;
pub mod profile;
pub mod prompt;
pub mod routing;

pub use diagram::{contains_diagram, extract_diagrams, Diagram};
pub use domain::{ChatMessage, ChatRole, ContentPart, LearningStyle, TokenUsage};
pub use ports::{
    ChatLogService, Completion, CompletionRequest, CompletionService, InMemoryProfileStore,
    PortError, PortResult, ProfileStore,
};
pub use profile::{score_quiz, OnboardingStep, MIN_COURSES, ProfileError, StreakChange, StudySession, UserProfile};
pub use prompt::{build_system_prompt, build_user_parts};
pub use routing::{ModelCatalog, ModelRoute};
