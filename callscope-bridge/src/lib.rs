//! Transcript insight bridge.
//!
//! Turns a call transcript into a structured [`LlmCallInsight`]. A language
//! model produces text; this crate builds the prompt, parses the reply into
//! the insight type, and falls back to keyword rules whenever the model is
//! unavailable or its reply cannot be parsed.
//!
//! Insights are keyed by call id and shown next to the pipeline metrics.
//! They are never merged into them.

pub mod analyzer;
pub mod error;
pub mod insight;
pub mod response;
pub mod store;

pub use analyzer::{
    analyze_transcripts, BatchConfig, CompletionClient, FallbackAnalyzer, KeywordAnalyzer,
    LlmAnalyzer, ReplayCompletionClient, TranscriptAnalyzer, TranscriptItem,
};
pub use error::{BridgeError, BridgeResult};
pub use insight::{KeyMoment, LlmCallInsight, RepPerformance, Speaker};
pub use response::{build_prompt, parse_insight_response, ANALYSIS_PROMPT};
pub use store::{load_insights, save_insights};
