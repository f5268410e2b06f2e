//! Model backends.
//!
//! [`mock`] hosts deterministic offline backends for every model port,
//! used by local development and tests. [`openai`] hosts the OpenAI-style
//! HTTP backends for embeddings, summarization, and answer synthesis.

pub mod mock;
pub mod openai;

pub use mock::{
    MockAnswerSynthesizer, MockAsrEngine, MockDiarizer, MockEmbeddingProvider,
    MockKeyframeExtractor, MockMediaProbe, MockMeetingClassifier, MockSceneDetector,
    MockSummarizer,
};
pub use openai::{OpenAiChatBackend, OpenAiEmbeddings, OpenAiSummarizer, OpenAiSynthesizer};
