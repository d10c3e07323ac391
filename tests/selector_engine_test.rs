// ==========================================
// InsightSelector 集成测试
// ==========================================
// 测试目标: Top-N 排序、最佳/最差选择、告警阈值
// ==========================================

use steel_recon::domain::types::RankMeasure;
use steel_recon::domain::GroupAggregate;
use steel_recon::engine::{InsightSelector, ALERT_LIMIT};

// ==========================================
// 测试辅助函数
// ==========================================

fn group(key: &str, production: f64, rejection_pct: f64, cost_per_kg: f64) -> GroupAggregate {
    GroupAggregate {
        key: key.to_string(),
        production,
        rejection_percentage: rejection_pct,
        cost_per_kg,
        ..GroupAggregate::new(key)
    }
}

#[test]
fn test_top_n_is_prefix_of_full_sort() {
    let groups = vec![
        group("a", 5.0, 0.0, 0.0),
        group("b", 50.0, 0.0, 0.0),
        group("c", 25.0, 0.0, 0.0),
        group("d", 50.0, 0.0, 0.0),
        group("e", 1.0, 0.0, 0.0),
    ];
    let sorted = InsightSelector::sort_descending(&groups, RankMeasure::Production);
    for n in 0..=6 {
        let top = InsightSelector::top_n(&groups, RankMeasure::Production, n);
        assert_eq!(top.len(), n.min(groups.len()));
        assert_eq!(top[..], sorted[..top.len()]);
    }
    assert_eq!(sorted[0].key, "b");
    assert_eq!(sorted[1].key, "d");
}

#[test]
fn test_rank_by_other_measure() {
    let groups = vec![group("a", 1.0, 0.0, 3.0), group("b", 9.0, 0.0, 1.0)];
    let top = InsightSelector::top_n(&groups, RankMeasure::CostPerKg, 1);
    assert_eq!(top[0].key, "a");
}

#[test]
fn test_best_and_worst_on_ties() {
    let groups = vec![
        group("zero", 10.0, 0.0, 0.0),
        group("first-low", 10.0, 1.0, 0.0),
        group("second-low", 10.0, 1.0, 0.0),
        group("first-high", 10.0, 9.0, 0.0),
        group("second-high", 10.0, 9.0, 0.0),
    ];
    let best = InsightSelector::best(&groups, RankMeasure::RejectionPercentage);
    let worst = InsightSelector::worst(&groups, RankMeasure::RejectionPercentage);
    assert_eq!(best.map(|g| g.key.as_str()), Some("first-low"));
    assert_eq!(worst.map(|g| g.key.as_str()), Some("first-high"));
}

#[test]
fn test_empty_selection() {
    assert!(InsightSelector::best(&[], RankMeasure::RejectionPercentage).is_none());
    assert!(InsightSelector::worst(&[], RankMeasure::RejectionPercentage).is_none());
    assert!(InsightSelector::alerts(&[], RankMeasure::RejectionPercentage, 2.0).is_empty());
}

#[test]
fn test_alert_threshold_is_strict() {
    let groups = vec![
        group("at-threshold", 10.0, 2.0, 0.0),
        group("just-above", 10.0, 2.01, 0.0),
    ];
    let alerts = InsightSelector::alerts(&groups, RankMeasure::RejectionPercentage, 2.0);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].key, "just-above");
}

#[test]
fn test_alerts_capped_and_sorted() {
    let groups: Vec<GroupAggregate> = (0..25)
        .map(|i| group(&format!("g{:02}", i), 1.0, 2.5 + i as f64 * 0.1, 0.0))
        .collect();
    let alerts = InsightSelector::alerts(&groups, RankMeasure::RejectionPercentage, 2.0);
    assert_eq!(alerts.len(), ALERT_LIMIT);
    assert!(alerts
        .windows(2)
        .all(|w| w[0].rejection_percentage >= w[1].rejection_percentage));
    assert_eq!(alerts[0].key, "g24");
}
