use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use serde::Serialize;

use callscope_bridge::{
    analyze_transcripts, load_insights, save_insights, BatchConfig, FallbackAnalyzer,
    KeywordAnalyzer, LlmAnalyzer, LlmCallInsight, ReplayCompletionClient, TranscriptAnalyzer,
    TranscriptItem,
};
use callscope_pipeline::analyzers::{ExecutiveView, MissedOpportunityPattern, RevenueImpact};
use callscope_pipeline::call_loader::load_calls_path;
use callscope_pipeline::{
    AllMetrics, CallDetail, Category, FilterParams, MetricsEngine, RandomOracle,
    RevenueAssumptionOverrides, Severity,
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum View {
    All,
    Upselling,
    FollowUps,
    Sales,
    Insights,
    NatesView,
    Patterns,
    Coaching,
    SalesFunnel,
    InspectionFunnel,
    Revenue,
    Calls,
    Category,
    LlmInsights,
}

/// Serve call-center metrics from a call record file or directory.
#[derive(Debug, Parser)]
#[command(name = "callscope-server", version)]
struct Args {
    /// Call records: a .json or .csv file, or a directory of .json files
    path: PathBuf,

    /// Only calls handled by this agent ("all" for every agent)
    #[arg(long)]
    agent: Option<String>,

    /// positive, neutral, negative or all
    #[arg(long)]
    sentiment: Option<String>,

    /// inbound, outbound or all
    #[arg(long)]
    call_type: Option<String>,

    #[arg(long, value_enum, default_value_t = View::All)]
    view: View,

    /// Drill-down category for --view category:
    /// upsell, followup, sales, inspections, agent-performance, pattern
    #[arg(long)]
    category: Option<String>,

    /// Pattern id for --category pattern
    #[arg(long)]
    pattern_id: Option<String>,

    /// Output pretty JSON instead of the text digest
    #[arg(long)]
    json: bool,

    /// Seed the coaching follow-up simulation for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of distinct filters kept in the metrics cache
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// JSON file of revenue assumption overrides
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Monthly recurring plan value ($)
    #[arg(long)]
    plan_value: Option<f64>,

    /// One-time termite inspection upsell value ($)
    #[arg(long)]
    termite_value: Option<f64>,

    /// Customer lifetime value ($)
    #[arg(long)]
    lifetime_value: Option<f64>,

    /// Inspection-to-sale conversion rate, 0 to 1
    #[arg(long)]
    inspection_rate: Option<f64>,

    /// Number of transcripts to analyze for --view llm-insights
    #[arg(long, default_value_t = 10)]
    insights_limit: usize,

    /// Directory of captured model replies named <callId>.txt
    #[arg(long)]
    responses: Option<PathBuf>,

    /// Saved insights file, read if present and written after analysis
    #[arg(long)]
    insights_file: Option<PathBuf>,
}

impl Args {
    fn filter(&self) -> anyhow::Result<FilterParams> {
        FilterParams::from_query(
            self.agent.as_deref(),
            self.sentiment.as_deref(),
            self.call_type.as_deref(),
        )
        .context("Invalid filter")
    }

    /// File overrides first, then individual flags on top.
    fn revenue_overrides(&self) -> anyhow::Result<RevenueAssumptionOverrides> {
        let from_file = match &self.assumptions {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Invalid assumptions file {}", path.display()))?
            }
            None => RevenueAssumptionOverrides::default(),
        };
        Ok(from_file.merge(RevenueAssumptionOverrides {
            avg_recurring_plan_value: self.plan_value,
            avg_termite_upsell_value: self.termite_value,
            avg_customer_lifetime_value: self.lifetime_value,
            inspection_conversion_rate: self.inspection_rate,
        }))
    }
}

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsJson<'a> {
    generated_at: String,
    filter: &'a FilterParams,
    calls_analyzed: usize,
    total_calls: usize,
    compute_ms: u128,
    metrics: &'a AllMetrics,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format a number with comma thousands separators.
fn format_dollars(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };

    let s = whole.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    format!("{}{}", sign, result.chars().rev().collect::<String>())
}

fn rule() {
    println!("  {:\u{2500}<64}", "");
}

fn print_header(filter: &FilterParams, analyzed: usize, total: usize) {
    println!();
    println!("  CALLSCOPE \u{00b7} Call Center Metrics");
    println!(
        "  filter {}  \u{00b7}  {} of {} calls  \u{00b7}  generated {}",
        filter.cache_key(),
        analyzed,
        total,
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    println!();
}

fn print_executive(view: &ExecutiveView) {
    let t = &view.termite_attachment;
    let f = &view.follow_up_capture;
    let s = &view.sales_vs_inspections;
    println!("  NATE'S VIEW");
    rule();
    println!(
        "  Termite attachment  {:>5.1}%  ({} of {} plans)",
        t.attachment_rate, t.inspections_attached, t.recurring_plans
    );
    println!("      {}", t.insight);
    println!(
        "  Follow-up capture   {:>5.1}%  ({} of {} acted on)",
        f.completion_rate, f.acted_on, f.total_follow_ups
    );
    println!("      {}", f.insight);
    println!(
        "  Sales {:>5.1}%  \u{00b7}  Inspections {:>5.1}%  ({} / {})",
        s.sales_rate, s.inspection_rate, s.sales, s.inspections
    );
    println!("      {}", s.insight);
    for p in &view.unknown_unknowns.top_patterns {
        println!("  \u{2022} {} ({} calls)", p.pattern, p.count);
    }
    println!("      {}", view.unknown_unknowns.insight);
    println!();
}

fn print_patterns(patterns: &[MissedOpportunityPattern]) {
    println!("  MISSED OPPORTUNITIES");
    rule();
    if patterns.is_empty() {
        println!("  No missed-opportunity patterns detected.");
    }
    for p in patterns {
        let icon = match p.severity {
            Severity::High => "!!",
            Severity::Medium => "! ",
            Severity::Low => "  ",
        };
        println!(
            "  {} {:44} {:>4} calls  ${:>8}",
            icon,
            p.pattern_name,
            p.count,
            format_dollars(p.estimated_revenue_impact as f64)
        );
    }
    println!();
}

fn print_metrics(metrics: &AllMetrics) {
    let u = &metrics.upselling;
    let f = &metrics.follow_ups;
    let s = &metrics.sales;
    println!("  HEADLINES");
    rule();
    println!(
        "  {} recurring plans  \u{00b7}  {} termite upsells  \u{00b7}  {:.1}% attachment",
        u.total_recurring_plans, u.termite_inspection_upsold, u.attachment_rate
    );
    println!(
        "  {} follow-ups ({:.1}% of calls)  \u{00b7}  {} acted on",
        f.total_follow_ups, f.follow_up_rate, f.follow_ups_acted_on
    );
    println!(
        "  {} sales ({:.1}%)  \u{00b7}  {} inspections ({:.1}%)",
        s.total_sales, s.sales_rate, s.total_inspections, s.inspection_rate
    );
    println!(
        "  ${} a year at risk from unworked follow-ups",
        format_dollars(metrics.insights.follow_up_leakage.estimated_lost_revenue as f64)
    );
    println!();
    print_executive(&metrics.nates_view);
    print_patterns(&metrics.patterns);
    print_coaching(metrics);
}

fn print_coaching(metrics: &AllMetrics) {
    println!("  COACHING");
    rule();
    if metrics.coaching.is_empty() {
        println!("  No coaching suggestions.");
    }
    for agent in &metrics.coaching {
        println!("  {}", agent.agent_name);
        for s in &agent.suggestions {
            println!("    [{}] {}: {}", s.priority, s.category, s.message);
        }
    }
    println!();
}

fn print_revenue(impact: &RevenueImpact) {
    println!("  REVENUE IMPACT (monthly)");
    rule();
    for (label, loss) in [
        ("Missed follow-ups", &impact.missed_follow_ups),
        ("Missed upsells", &impact.missed_upsells),
        ("Lost inspections", &impact.lost_inspections),
        ("Price objections", &impact.price_objections),
    ] {
        println!(
            "  {:18} {:>4}  ${:>8}  {}",
            label,
            loss.count,
            format_dollars(loss.estimated_monthly_loss as f64),
            loss.description
        );
    }
    rule();
    println!(
        "  {:18}       ${:>8}",
        "Total",
        format_dollars(impact.total_estimated_monthly_loss as f64)
    );
    println!();
}

fn print_calls(details: &[CallDetail]) {
    println!("  {} calls", details.len());
    rule();
    for d in details {
        println!(
            "  {:12} {:16} {:10} {:8} {:>5.1} min  {}",
            d.call_id, d.agent_name, d.outcome, d.sentiment, d.duration_minutes, d.date
        );
    }
    println!();
}

fn print_insights(insights: &[LlmCallInsight]) {
    println!("  TRANSCRIPT INSIGHTS");
    rule();
    for i in insights {
        println!(
            "  {:12} {:10} {:8} upsell {}  {}",
            i.call_id,
            i.sale_outcome,
            i.sentiment,
            if i.upsell_attempted { "yes" } else { "no " },
            i.customer_intent
        );
        if let Some(phrase) = &i.follow_up_phrase {
            println!("      follow-up: {phrase}");
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// Transcript insights
// ---------------------------------------------------------------------------

async fn transcript_insights(
    args: &Args,
    engine: &MetricsEngine,
    filter: &FilterParams,
) -> anyhow::Result<Vec<LlmCallInsight>> {
    if let Some(path) = &args.insights_file {
        let saved = load_insights(path);
        if !saved.is_empty() {
            log::info!("Loaded {} saved insights from {}", saved.len(), path.display());
            return Ok(saved);
        }
    }

    let items: Vec<TranscriptItem> = engine
        .calls(filter)
        .into_iter()
        .filter(|c| !c.transcript.trim().is_empty())
        .take(args.insights_limit)
        .map(|c| TranscriptItem {
            call_id: c.id,
            transcript: c.transcript,
        })
        .collect();

    let analyzer: Box<dyn TranscriptAnalyzer> = match &args.responses {
        Some(dir) => Box::new(FallbackAnalyzer::new(LlmAnalyzer::new(
            ReplayCompletionClient::new(dir),
        ))),
        None => Box::new(KeywordAnalyzer),
    };
    // Captured replies need no rate limiting.
    let config = BatchConfig {
        delay: if args.responses.is_some() {
            Duration::ZERO
        } else {
            BatchConfig::default().delay
        },
        ..BatchConfig::default()
    };
    let insights = analyze_transcripts(analyzer.as_ref(), &items, &config).await;

    if let Some(path) = &args.insights_file {
        save_insights(path, &insights)
            .with_context(|| format!("Failed to save insights to {}", path.display()))?;
    }
    Ok(insights)
}

fn load_records(path: &Path) -> anyhow::Result<Vec<callscope_pipeline::CallRecord>> {
    let records = load_calls_path(path)
        .with_context(|| format!("Failed to load call records from {}", path.display()))?;
    log::info!("Loaded {} calls from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let filter = args.filter()?;

    let load_start = Instant::now();
    let records = load_records(&args.path)?;

    let mut builder = MetricsEngine::builder(records).cache_capacity(args.cache_capacity);
    if let Some(seed) = args.seed {
        builder = builder.coaching_oracle(RandomOracle::seeded(seed));
    }
    let engine = builder.build();
    let total_calls = engine.records().len();
    log::debug!("Engine ready in {}ms", load_start.elapsed().as_millis());

    match args.view {
        View::Revenue => {
            let overrides = args.revenue_overrides()?;
            let impact = engine
                .revenue_impact(&filter, &overrides)
                .context("Invalid revenue assumptions")?;
            if args.json {
                return print_json(&impact);
            }
            print_header(&filter, engine.calls(&filter).len(), total_calls);
            print_revenue(&impact);
        }
        View::Calls => {
            let calls = engine.calls(&filter);
            if args.json {
                return print_json(&calls);
            }
            let details: Vec<CallDetail> = calls.iter().map(CallDetail::from).collect();
            print_header(&filter, details.len(), total_calls);
            print_calls(&details);
        }
        View::Category => {
            let Some(name) = args.category.as_deref() else {
                bail!("--view category requires --category");
            };
            let category =
                Category::parse(name, args.agent.as_deref(), args.pattern_id.as_deref())?;
            let details = engine.calls_by_category(&filter, &category);
            if args.json {
                return print_json(&details);
            }
            print_header(&filter, details.len(), total_calls);
            print_calls(&details);
        }
        View::LlmInsights => {
            let insights = transcript_insights(&args, &engine, &filter).await?;
            if args.json {
                return print_json(&insights);
            }
            print_insights(&insights);
        }
        view => {
            let compute_start = Instant::now();
            let metrics = engine.metrics(&filter);
            let compute_ms = compute_start.elapsed().as_millis();
            let analyzed = engine.calls(&filter).len();

            if args.json {
                return match view {
                    View::Upselling => print_json(&metrics.upselling),
                    View::FollowUps => print_json(&metrics.follow_ups),
                    View::Sales => print_json(&metrics.sales),
                    View::Insights => print_json(&metrics.insights),
                    View::NatesView => print_json(&metrics.nates_view),
                    View::Patterns => print_json(&metrics.patterns),
                    View::Coaching => print_json(&metrics.coaching),
                    View::SalesFunnel => print_json(&metrics.sales_funnel),
                    View::InspectionFunnel => print_json(&metrics.inspection_funnel),
                    _ => print_json(&MetricsJson {
                        generated_at: Utc::now().to_rfc3339(),
                        filter: &filter,
                        calls_analyzed: analyzed,
                        total_calls,
                        compute_ms,
                        metrics: metrics.as_ref(),
                    }),
                };
            }

            print_header(&filter, analyzed, total_calls);
            match view {
                View::NatesView => print_executive(&metrics.nates_view),
                View::Patterns => print_patterns(&metrics.patterns),
                View::Coaching => print_coaching(&metrics),
                View::All => print_metrics(&metrics),
                // Sections without a digest layout print as JSON.
                _ => {
                    let section = match view {
                        View::Upselling => serde_json::to_value(&metrics.upselling)?,
                        View::FollowUps => serde_json::to_value(&metrics.follow_ups)?,
                        View::Sales => serde_json::to_value(&metrics.sales)?,
                        View::Insights => serde_json::to_value(&metrics.insights)?,
                        View::SalesFunnel => serde_json::to_value(&metrics.sales_funnel)?,
                        _ => serde_json::to_value(&metrics.inspection_funnel)?,
                    };
                    print_json(&section)?;
                }
            }
            println!("  \u{23f1}  Metrics computed in {}ms", compute_ms);
            println!();
        }
    }
    Ok(())
}
