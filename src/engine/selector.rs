// ==========================================
// 锻造 ERP 产量对账引擎 - 排名与洞察选择器
// ==========================================
// top_n: 按口径稳定降序取前 N
// best: 排除比率为 0 的分组后取最小（并列取先出现者）
// worst: 直接取最大（并列取先出现者）
// alerts: 比率严格大于阈值 → 降序 → 取前 ALERT_LIMIT
// ==========================================

use crate::domain::aggregate::GroupAggregate;
use crate::domain::types::RankMeasure;
use std::cmp::Ordering;

/// 告警列表上限
pub const ALERT_LIMIT: usize = 10;

/// 取分组在某口径上的值
pub fn measure_value(agg: &GroupAggregate, measure: RankMeasure) -> f64 {
    match measure {
        RankMeasure::Production => agg.production,
        RankMeasure::Target => agg.target,
        RankMeasure::Rejection => agg.rejection,
        RankMeasure::Rework => agg.rework,
        RankMeasure::WeightKg => agg.weight_kg,
        RankMeasure::Cost => agg.cost,
        RankMeasure::Units => agg.units,
        RankMeasure::RecordCount => agg.record_count as f64,
        RankMeasure::RejectionPercentage => agg.rejection_percentage,
        RankMeasure::ReworkPercentage => agg.rework_percentage,
        RankMeasure::AchievementPercentage => agg.achievement_percentage,
        RankMeasure::CostPerKg => agg.cost_per_kg,
    }
}

fn descending(a: &GroupAggregate, b: &GroupAggregate, measure: RankMeasure) -> Ordering {
    measure_value(b, measure).total_cmp(&measure_value(a, measure))
}

pub struct InsightSelector;

impl InsightSelector {
    /// 按口径稳定降序排序（并列保持原顺序）
    pub fn sort_descending(aggregates: &[GroupAggregate], measure: RankMeasure) -> Vec<GroupAggregate> {
        let mut sorted = aggregates.to_vec();
        sorted.sort_by(|a, b| descending(a, b, measure));
        sorted
    }

    /// 前 N 名
    pub fn top_n(aggregates: &[GroupAggregate], measure: RankMeasure, n: usize) -> Vec<GroupAggregate> {
        let mut sorted = Self::sort_descending(aggregates, measure);
        sorted.truncate(n);
        sorted
    }

    /// 最佳表现（比率越小越好，排除比率为 0 的分组）
    pub fn best(aggregates: &[GroupAggregate], ratio: RankMeasure) -> Option<&GroupAggregate> {
        let mut best: Option<(&GroupAggregate, f64)> = None;
        for agg in aggregates {
            let value = measure_value(agg, ratio);
            if value == 0.0 {
                continue;
            }
            match best {
                Some((_, current)) if value.total_cmp(&current) != Ordering::Less => {}
                _ => best = Some((agg, value)),
            }
        }
        best.map(|(agg, _)| agg)
    }

    /// 最差表现（比率最大）
    pub fn worst(aggregates: &[GroupAggregate], ratio: RankMeasure) -> Option<&GroupAggregate> {
        let mut worst: Option<(&GroupAggregate, f64)> = None;
        for agg in aggregates {
            let value = measure_value(agg, ratio);
            match worst {
                Some((_, current)) if value.total_cmp(&current) != Ordering::Greater => {}
                _ => worst = Some((agg, value)),
            }
        }
        worst.map(|(agg, _)| agg)
    }

    /// 告警列表（严格大于阈值）
    pub fn alerts(aggregates: &[GroupAggregate], ratio: RankMeasure, threshold: f64) -> Vec<GroupAggregate> {
        let exceeding: Vec<GroupAggregate> = aggregates
            .iter()
            .filter(|agg| measure_value(agg, ratio) > threshold)
            .cloned()
            .collect();
        Self::top_n(&exceeding, ratio, ALERT_LIMIT)
    }
}
