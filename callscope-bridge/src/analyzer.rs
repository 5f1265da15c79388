use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use callscope_pipeline::{Outcome, Sentiment};

use crate::error::{BridgeError, BridgeResult};
use crate::insight::{KeyMoment, LlmCallInsight, RepPerformance, Speaker};
use crate::response::{build_prompt, parse_insight_response};

/// Produces an insight from one call transcript.
#[async_trait]
pub trait TranscriptAnalyzer: Send + Sync {
    async fn analyze(&self, call_id: &str, transcript: &str) -> BridgeResult<LlmCallInsight>;

    fn name(&self) -> &'static str;
}

/// Text completion backend, e.g. a hosted language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, call_id: &str, prompt: &str) -> BridgeResult<String>;
}

// ---------------------------------------------------------------------------
// Keyword rules
// ---------------------------------------------------------------------------

/// Deterministic substring rules over the lowercased transcript.
///
/// Used when no model is configured or a model reply is unusable. The rules
/// are coarse: "no" matches inside any word, so most transcripts without
/// "great" or "perfect" read as negative.
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn analyze_text(&self, call_id: &str, transcript: &str) -> LlmCallInsight {
        let text = transcript.to_lowercase();
        let has = |needle: &str| text.contains(needle);

        let upsell_attempted = has("recurring") || has("plan");
        let upsell_attached_to_recurring = has("termite") && upsell_attempted;

        let follow_up_requested = has("call back") || has("follow up");
        let sale_outcome = if has("sign up") || has("yes") {
            Outcome::Sale
        } else if has("schedule") || has("inspection") {
            Outcome::Inspection
        } else if follow_up_requested {
            Outcome::FollowUp
        } else {
            Outcome::NoAction
        };
        let follow_up_phrase = follow_up_requested.then(|| {
            if has("spouse") {
                "Need to discuss with spouse".to_string()
            } else {
                "Call me back".to_string()
            }
        });

        let mut objections = Vec::new();
        if has("expensive") || has("cost") {
            objections.push("Price concern".to_string());
        }
        if has("think") || has("consider") {
            objections.push("Need time to consider".to_string());
        }

        let sentiment = if has("great") || has("perfect") {
            Sentiment::Positive
        } else if has("no") || has("not interested") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };

        let mut key_moments = Vec::new();
        if upsell_attempted {
            key_moments.push(KeyMoment {
                timestamp: "2:30".into(),
                speaker: Speaker::Agent,
                quote: "Would you be interested in our recurring plan?".into(),
                significance: "Upsell attempt".into(),
            });
        }
        if let Some(first) = objections.first() {
            key_moments.push(KeyMoment {
                timestamp: "4:15".into(),
                speaker: Speaker::Customer,
                quote: first.clone(),
                significance: "Objection raised".into(),
            });
        }

        let customer_intent = match sale_outcome {
            Outcome::Sale => "Ready to purchase",
            Outcome::Inspection => "Interested in inspection",
            _ => "Gathering information",
        };

        let mut rep = RepPerformance::default();
        if upsell_attempted {
            rep.strengths.push("Proactive upsell attempt".into());
        }
        if upsell_attached_to_recurring {
            rep.strengths.push("Successfully attached termite inspection".into());
        }
        if !upsell_attempted && sale_outcome == Outcome::Sale {
            rep.weaknesses.push("Missed upsell opportunity".into());
        }
        if !objections.is_empty() && sale_outcome != Outcome::Sale {
            rep.weaknesses.push("Objection not handled".into());
        }

        LlmCallInsight {
            call_id: call_id.to_string(),
            upsell_attempted,
            upsell_attached_to_recurring,
            sale_outcome,
            follow_up_requested,
            follow_up_phrase,
            objections,
            sentiment,
            key_moments,
            customer_intent: customer_intent.to_string(),
            rep_performance: rep,
        }
    }
}

#[async_trait]
impl TranscriptAnalyzer for KeywordAnalyzer {
    async fn analyze(&self, call_id: &str, transcript: &str) -> BridgeResult<LlmCallInsight> {
        Ok(self.analyze_text(call_id, transcript))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

// ---------------------------------------------------------------------------
// Model-backed analysis
// ---------------------------------------------------------------------------

/// Prompts a completion backend and parses its reply.
pub struct LlmAnalyzer<C> {
    client: C,
}

impl<C: CompletionClient> LlmAnalyzer<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: CompletionClient> TranscriptAnalyzer for LlmAnalyzer<C> {
    async fn analyze(&self, call_id: &str, transcript: &str) -> BridgeResult<LlmCallInsight> {
        let prompt = build_prompt(transcript);
        let reply = self.client.complete(call_id, &prompt).await?;
        parse_insight_response(call_id, &reply)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Serves previously captured model replies from `<dir>/<call_id>.txt`.
pub struct ReplayCompletionClient {
    dir: PathBuf,
}

impl ReplayCompletionClient {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CompletionClient for ReplayCompletionClient {
    async fn complete(&self, call_id: &str, _prompt: &str) -> BridgeResult<String> {
        let path = self.dir.join(format!("{call_id}.txt"));
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            BridgeError::AnalyzerUnavailable(format!("no reply at {}: {e}", path.display()))
        })
    }
}

/// Runs `primary`, and keyword rules whenever it fails.
pub struct FallbackAnalyzer<P> {
    primary: P,
    fallback: KeywordAnalyzer,
}

impl<P: TranscriptAnalyzer> FallbackAnalyzer<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: KeywordAnalyzer,
        }
    }
}

#[async_trait]
impl<P: TranscriptAnalyzer> TranscriptAnalyzer for FallbackAnalyzer<P> {
    async fn analyze(&self, call_id: &str, transcript: &str) -> BridgeResult<LlmCallInsight> {
        match self.primary.analyze(call_id, transcript).await {
            Ok(insight) => Ok(insight),
            Err(e) => {
                log::warn!(
                    "{} analysis failed for {call_id}, using keyword rules: {e}",
                    self.primary.name()
                );
                Ok(self.fallback.analyze_text(call_id, transcript))
            }
        }
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptItem {
    pub call_id: String,
    pub transcript: String,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Transcripts analyzed concurrently per batch.
    pub batch_size: usize,
    /// Pause between batches. Not applied after the last one.
    pub delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// Analyze `items` in rate-limited batches, preserving input order.
///
/// An item whose analysis fails is analyzed by keyword rules instead, so
/// the result always has one insight per item.
pub async fn analyze_transcripts<A>(
    analyzer: &A,
    items: &[TranscriptItem],
    config: &BatchConfig,
) -> Vec<LlmCallInsight>
where
    A: TranscriptAnalyzer + ?Sized,
{
    let batch_size = config.batch_size.max(1);
    let total_batches = items.len().div_ceil(batch_size);
    log::info!(
        "Starting {} analysis: {} calls in {} batches",
        analyzer.name(),
        items.len(),
        total_batches
    );

    let mut results = Vec::with_capacity(items.len());
    for (index, batch) in items.chunks(batch_size).enumerate() {
        log::info!(
            "Processing batch {}/{} ({} calls)",
            index + 1,
            total_batches,
            batch.len()
        );
        let replies = futures::future::join_all(
            batch
                .iter()
                .map(|item| analyzer.analyze(&item.call_id, &item.transcript)),
        )
        .await;

        for (item, reply) in batch.iter().zip(replies) {
            match reply {
                Ok(insight) => results.push(insight),
                Err(e) => {
                    log::warn!("Analysis failed for {}: {e}", item.call_id);
                    results.push(KeywordAnalyzer.analyze_text(&item.call_id, &item.transcript));
                }
            }
        }

        if index + 1 < total_batches && !config.delay.is_zero() {
            tokio::time::sleep(config.delay).await;
        }
    }

    log::info!("Completed analysis: {} insights generated", results.len());
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_sale_with_upsell() {
        let insight = KeywordAnalyzer.analyze_text(
            "c1",
            "Agent: Our recurring plan includes a termite check. Customer: Yes, sign up!",
        );
        assert!(insight.upsell_attempted);
        assert!(insight.upsell_attached_to_recurring);
        assert_eq!(insight.sale_outcome, Outcome::Sale);
        assert_eq!(insight.customer_intent, "Ready to purchase");
        assert_eq!(
            insight.rep_performance.strengths,
            vec!["Proactive upsell attempt", "Successfully attached termite inspection"]
        );
        assert_eq!(insight.key_moments.len(), 1);
        assert_eq!(insight.key_moments[0].timestamp, "2:30");
    }

    #[test]
    fn keyword_follow_up_with_spouse() {
        let insight = KeywordAnalyzer.analyze_text(
            "c2",
            "Customer: It's expensive. I need to ask my spouse, please call back Friday.",
        );
        assert_eq!(insight.sale_outcome, Outcome::FollowUp);
        assert!(insight.follow_up_requested);
        assert_eq!(
            insight.follow_up_phrase.as_deref(),
            Some("Need to discuss with spouse")
        );
        assert_eq!(insight.objections, vec!["Price concern"]);
        assert_eq!(insight.key_moments[0].speaker, Speaker::Customer);
        assert_eq!(insight.key_moments[0].quote, "Price concern");
        assert_eq!(insight.rep_performance.weaknesses, vec!["Objection not handled"]);
    }

    #[test]
    fn keyword_sale_without_upsell_is_a_weakness() {
        let insight = KeywordAnalyzer.analyze_text("c3", "Customer: Yes. Agent: Perfect.");
        assert_eq!(insight.sale_outcome, Outcome::Sale);
        assert_eq!(insight.sentiment, Sentiment::Positive);
        assert_eq!(insight.rep_performance.weaknesses, vec!["Missed upsell opportunity"]);
    }

    #[test]
    fn keyword_no_matches_inside_words() {
        let insight = KeywordAnalyzer.analyze_text("c4", "Agent: I know.");
        assert_eq!(insight.sentiment, Sentiment::Negative);
        assert_eq!(insight.sale_outcome, Outcome::NoAction);
        assert_eq!(insight.customer_intent, "Gathering information");
        assert!(insight.follow_up_phrase.is_none());
    }

    #[test]
    fn keyword_neutral_when_nothing_matches() {
        let insight = KeywordAnalyzer.analyze_text("c5", "Agent: Hello.");
        assert_eq!(insight.sentiment, Sentiment::Neutral);
        assert!(insight.key_moments.is_empty());
    }
}
