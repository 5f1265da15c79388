use callscope_pipeline::analyzers::patterns::{rule, FOLLOW_UP_NOT_ACTED};
use callscope_pipeline::analyzers::*;
use callscope_pipeline::assumptions::{RevenueAssumptionOverrides, RevenueAssumptions};
use callscope_pipeline::filter::filter_calls;
use callscope_pipeline::metrics::{compute_all_metrics_with, MetricsEngine};
use callscope_pipeline::oracle::{IdSeededOracle, RandomOracle};
use callscope_pipeline::types::*;
use callscope_pipeline::{Category, FollowUpCompletionOracle};

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

fn record(id: &str, agent: &str, outcome: Outcome) -> CallRecord {
    CallRecord {
        id: id.into(),
        agent_name: agent.into(),
        customer_name: format!("Customer {id}"),
        date: "2025-04-02T14:00:00Z".into(),
        duration: 240,
        outcome,
        ..CallRecord::default()
    }
}

/// The three-call scenario: a plan sale with termite attached, a bare
/// inspection, and a no-action follow-up.
fn scenario() -> Vec<CallRecord> {
    vec![
        CallRecord {
            recurring_plan: true,
            termite_inspection_upsold: true,
            ..record("a", "A", Outcome::Sale)
        },
        record("b", "A", Outcome::Inspection),
        CallRecord {
            follow_up_requested: true,
            follow_up_reason: Some("Needs time to consider".into()),
            ..record("c", "B", Outcome::NoAction)
        },
    ]
}

/// A larger mixed book across three agents.
fn mixed_book() -> Vec<CallRecord> {
    let mut calls = Vec::new();
    for i in 0..12 {
        let outcome = match i % 4 {
            0 => Outcome::Sale,
            1 => Outcome::Inspection,
            2 => Outcome::FollowUp,
            _ => Outcome::NoAction,
        };
        let agent = ["Dana", "Eli", "Fay"][i % 3];
        calls.push(CallRecord {
            duration: 90 + (i as u64) * 70,
            sentiment: match i % 3 {
                0 => Sentiment::Positive,
                1 => Sentiment::Neutral,
                _ => Sentiment::Negative,
            },
            call_type: if i % 2 == 0 {
                CallType::Inbound
            } else {
                CallType::Outbound
            },
            recurring_plan: i % 4 == 0 || i == 5,
            termite_inspection_upsold: i % 8 == 0,
            follow_up_requested: i % 4 == 2 || i == 7,
            follow_up_reason: (i % 4 == 2).then(|| "Call me back".to_string()),
            upsell_attempted: Some(i % 3 == 0),
            upsell_success: Some(i % 8 == 0),
            price_objection: Some(i % 4 == 3),
            ..record(&format!("{:08x}-call", 0x1000 + i * 37), agent, outcome)
        });
    }
    calls
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[test]
fn empty_filter_is_identity() {
    let calls = mixed_book();
    assert_eq!(filter_calls(&calls, &FilterParams::default()), calls);
}

#[test]
fn filtering_preserves_relative_order() {
    let calls = mixed_book();
    let params = FilterParams::from_query(None, Some("negative"), Some("all")).unwrap();
    let filtered = filter_calls(&calls, &params);
    let positions: Vec<usize> = filtered
        .iter()
        .map(|f| calls.iter().position(|c| c.id == f.id).unwrap())
        .collect();
    assert!(!positions.is_empty());
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(filtered.iter().all(|c| c.sentiment == Sentiment::Negative));
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

#[test]
fn three_call_scenario() {
    let m = compute_all_metrics_with(&scenario(), &IdSeededOracle, &RandomOracle::seeded(3));

    assert_eq!(m.sales.total_sales, 1);
    assert_eq!(m.sales.total_inspections, 1);
    assert!((m.sales.sales_rate - 33.3).abs() < 0.05);
    assert!((m.sales.inspection_rate - 33.3).abs() < 0.05);

    assert_eq!(m.upselling.total_recurring_plans, 1);
    assert_eq!(m.upselling.termite_inspection_upsold, 1);
    assert_eq!(m.upselling.attachment_rate, 100.0);

    assert_eq!(m.follow_ups.total_follow_ups, 1);
    assert_eq!(m.follow_ups.follow_ups_by_reason.len(), 1);
    assert_eq!(m.follow_ups.follow_ups_by_reason["Needs time to consider"], 1);
}

#[test]
fn empty_collection_yields_zeroes() {
    let m = compute_all_metrics_with(&[], &IdSeededOracle, &RandomOracle::seeded(3));

    assert_eq!(m.upselling, UpsellingMetrics::default());
    assert_eq!(m.follow_ups, FollowUpMetrics::default());
    assert_eq!(m.sales, SalesMetrics::default());
    assert_eq!(m.insights.average_call_duration, 0);
    assert!(m.insights.sentiment_breakdown.is_empty());
    assert!(m.patterns.is_empty());
    assert!(m.coaching.is_empty());
    assert_eq!(m.sales_funnel.success_rate, 0.0);
    assert_eq!(m.inspection_funnel.booking_rate, 0.0);
    assert!(m.inspection_funnel.typical_objections.is_empty());

    let impact = calculate_revenue_impact(&[], &RevenueAssumptions::default());
    assert_eq!(impact.total_estimated_monthly_loss, 0);
}

// ---------------------------------------------------------------------------
// Aggregate properties
// ---------------------------------------------------------------------------

#[test]
fn per_agent_sales_sum_to_totals() {
    let m = analyze_sales(&mixed_book());
    assert_eq!(m.sales_by_agent.values().sum::<usize>(), m.total_sales);
    assert_eq!(m.inspections_by_agent.values().sum::<usize>(), m.total_inspections);
}

#[test]
fn attachment_rate_is_unclamped_ratio() {
    let calls = vec![
        CallRecord {
            recurring_plan: true,
            ..record("1", "A", Outcome::Sale)
        },
        CallRecord {
            termite_inspection_upsold: true,
            ..record("2", "A", Outcome::Inspection)
        },
        CallRecord {
            termite_inspection_upsold: true,
            ..record("3", "A", Outcome::Inspection)
        },
    ];
    let m = analyze_upselling(&calls);
    assert_eq!(m.attachment_rate, 2.0 / 1.0 * 100.0);
}

#[test]
fn followup_pattern_members_satisfy_predicate() {
    let calls = mixed_book();
    let patterns = detect_missed_opportunity_patterns(&calls);
    let followup = patterns
        .iter()
        .find(|p| p.pattern_id == FOLLOW_UP_NOT_ACTED)
        .expect("mixed book has unworked follow-ups");
    for id in &followup.affected_call_ids {
        let call = calls.iter().find(|c| &c.id == id).unwrap();
        assert!(call.follow_up_requested);
        assert!(!call.recurring_plan);
        assert_ne!(call.outcome, Outcome::Sale);
        assert!((rule(FOLLOW_UP_NOT_ACTED).unwrap().matches)(call));
    }
    assert_eq!(followup.count, followup.affected_call_ids.len());
}

#[test]
fn patterns_sorted_by_severity_then_count() {
    let patterns = detect_missed_opportunity_patterns(&mixed_book());
    assert!(patterns.len() >= 2);
    for pair in patterns.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.severity > b.severity || (a.severity == b.severity && a.count >= b.count));
    }
}

#[test]
fn coaching_only_lists_agents_with_triggered_rules() {
    struct Never;
    impl FollowUpCompletionOracle for Never {
        fn acted_on(&self, _call: &CallRecord) -> bool {
            false
        }
    }

    let calls = mixed_book();
    let coaching = generate_coaching_suggestions(&calls, &Never);
    for agent in &coaching {
        assert!(!agent.suggestions.is_empty());
    }
    // Plan sales with attached upsells and nothing else trigger no rule.
    let clean: Vec<_> = (0..3)
        .map(|i| CallRecord {
            recurring_plan: true,
            termite_inspection_upsold: true,
            ..record(&i.to_string(), "Gus", Outcome::Sale)
        })
        .collect();
    assert!(generate_coaching_suggestions(&clean, &Never).is_empty());
}

// ---------------------------------------------------------------------------
// Revenue impact
// ---------------------------------------------------------------------------

#[test]
fn total_loss_is_sum_of_rounded_parts() {
    let impact = calculate_revenue_impact(&mixed_book(), &RevenueAssumptions::default());
    assert_eq!(
        impact.total_estimated_monthly_loss,
        impact.missed_follow_ups.estimated_monthly_loss
            + impact.missed_upsells.estimated_monthly_loss
            + impact.lost_inspections.estimated_monthly_loss
            + impact.price_objections.estimated_monthly_loss
    );
}

#[test]
fn doubling_plan_value_doubles_follow_up_and_objection_losses() {
    let calls = mixed_book();
    let base = calculate_revenue_impact(&calls, &RevenueAssumptions::default());
    let doubled = calculate_revenue_impact(
        &calls,
        &RevenueAssumptionOverrides {
            avg_recurring_plan_value: Some(300.0),
            ..Default::default()
        }
        .apply(),
    );

    assert!(base.missed_follow_ups.estimated_monthly_loss > 0);
    assert!(base.price_objections.estimated_monthly_loss > 0);
    assert_eq!(
        doubled.missed_follow_ups.estimated_monthly_loss,
        2 * base.missed_follow_ups.estimated_monthly_loss
    );
    assert_eq!(
        doubled.price_objections.estimated_monthly_loss,
        2 * base.price_objections.estimated_monthly_loss
    );
    assert_eq!(
        doubled.missed_upsells.estimated_monthly_loss,
        base.missed_upsells.estimated_monthly_loss
    );
    assert_eq!(doubled.assumptions.avg_recurring_plan_value, 300.0);
}

// ---------------------------------------------------------------------------
// Engine and cache
// ---------------------------------------------------------------------------

#[test]
fn engine_caches_per_filter_and_matches_direct_computation() {
    let calls = mixed_book();
    let engine = MetricsEngine::builder(calls.clone())
        .coaching_oracle(RandomOracle::seeded(11))
        .build();
    assert_eq!(engine.cached_filters(), 1);

    let filter = FilterParams::from_query(Some("Eli"), None, None).unwrap();
    let first = engine.metrics(&filter);
    let second = engine.metrics(&filter);
    assert_eq!(first, second);
    assert_eq!(engine.cached_filters(), 2);

    let eli = filter_calls(&calls, &filter);
    assert_eq!(first.sales, analyze_sales(&eli));
    assert_eq!(first.patterns, detect_missed_opportunity_patterns(&eli));
    assert_eq!(
        first.insights,
        get_additional_insights(&eli, &IdSeededOracle)
    );
    assert_eq!(engine.calls(&filter), eli);
}

#[test]
fn bounded_cache_still_answers() {
    let engine = MetricsEngine::builder(mixed_book())
        .cache_capacity(Some(1))
        .build();
    let dana = FilterParams::from_query(Some("Dana"), None, None).unwrap();
    let m = engine.metrics(&dana);
    assert_eq!(m.sales_funnel.total_calls, 4);
    assert_eq!(engine.cached_filters(), 1);
}

#[test]
fn engine_revenue_impact_respects_filter() {
    let engine = MetricsEngine::new(scenario());
    let b_only = FilterParams::from_query(Some("B"), None, None).unwrap();
    let impact = engine
        .revenue_impact(&b_only, &RevenueAssumptionOverrides::default())
        .unwrap();
    assert_eq!(impact.missed_follow_ups.count, 1);
    assert_eq!(impact.missed_upsells.count, 0);
    assert_eq!(impact.assumptions, RevenueAssumptions::default());
}

#[test]
fn engine_drilldown_by_category() {
    let engine = MetricsEngine::new(scenario());
    let all = FilterParams::default();
    let followups = engine.calls_by_category(&all, &Category::FollowUp);
    assert_eq!(followups.len(), 1);
    assert_eq!(followups[0].call_id, "c");
    assert_eq!(followups[0].duration_minutes, 4.0);

    let framing = Category::parse("pattern", None, Some("inspection-no-plan-framing")).unwrap();
    let listed = engine.calls_by_category(&all, &framing);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].call_id, "b");
}

#[test]
fn metrics_serialize_with_dashboard_field_names() {
    let m = compute_all_metrics_with(&scenario(), &IdSeededOracle, &RandomOracle::seeded(3));
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["upselling"]["attachmentRate"], 100.0);
    assert_eq!(json["followUps"]["followUpsByReason"]["Needs time to consider"], 1);
    assert!(json["natesView"]["termiteAttachment"]["insight"].is_string());
    assert_eq!(json["insights"]["sentimentBreakdown"]["neutral"], 3);
    assert_eq!(json["salesFunnel"]["agentPerformance"]["A"]["calls"], 2);
}
