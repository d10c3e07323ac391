// ==========================================
// 锻造 ERP 产量对账引擎 - 部门看板引擎
// ==========================================
// 流程: 归一化 → NPD 分区 → 分组聚合 → KPI → 排名/洞察
// 输入: 已拉取完毕的单部门记录集 + 查询参数
// 输出: DashboardReport（KPI / 图表分组 / Top-N / 最佳最差 / 告警 / 缺陷分布 / 班次 / 日趋势）
// ==========================================

use crate::config::department_profile::DepartmentProfile;
use crate::domain::aggregate::GroupAggregate;
use crate::domain::record::{NormalizedRecord, RawRecord, UNKNOWN_KEY};
use crate::domain::summary::{CategoryShare, DashboardReport, KpiSummary, TrendPoint};
use crate::domain::types::{GroupField, NpdMode, RankMeasure};
use crate::engine::aggregator::{AggregateOptions, GroupingAggregator};
use crate::engine::normalizer::RecordNormalizer;
use crate::engine::partitioner::NpdPartitioner;
use crate::engine::selector::InsightSelector;
use crate::engine::yield_calc;
use uuid::Uuid;

/// 看板查询参数（由外部应用状态显式传入）
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardQuery {
    pub npd_mode: NpdMode,
    pub group_by: GroupField,
    pub rank_measure: RankMeasure,
    pub top_n: usize,
    pub drop_inactive: bool,
}

impl DashboardQuery {
    /// 部门默认查询
    pub fn for_profile(profile: &DepartmentProfile) -> Self {
        Self {
            npd_mode: NpdMode::default(),
            group_by: profile.default_group_field,
            rank_measure: RankMeasure::Production,
            top_n: crate::config::DEFAULT_TOP_N,
            drop_inactive: true,
        }
    }
}

// ==========================================
// DashboardEngine - 部门看板引擎
// ==========================================
// 红线: 无状态引擎，每次筛选变化都从头重算
pub struct DashboardEngine;

impl DashboardEngine {
    /// 从原始记录构建看板
    pub fn build(
        records: &[RawRecord],
        profile: &DepartmentProfile,
        query: &DashboardQuery,
        cost_per_unit: f64,
    ) -> DashboardReport {
        let normalized = RecordNormalizer::for_profile(profile).normalize_all(records);
        Self::build_normalized(&normalized, profile, query, cost_per_unit)
    }

    /// 从已归一化记录构建看板
    pub fn build_normalized(
        records: &[NormalizedRecord],
        profile: &DepartmentProfile,
        query: &DashboardQuery,
        cost_per_unit: f64,
    ) -> DashboardReport {
        let run_id = Uuid::new_v4().to_string();

        // 1. NPD 分区
        let partitioned = NpdPartitioner::partition(records, query.npd_mode);

        // 2. 分组聚合
        let options = AggregateOptions {
            drop_inactive: query.drop_inactive,
            cost_per_unit,
        };
        let aggregator = GroupingAggregator::new(profile, options);
        let groups = aggregator.aggregate(partitioned.iter().copied(), query.group_by);

        // 3. KPI（总计口径与分组同一公式）
        let total = aggregator.total(partitioned.iter().copied(), "Total");
        let npd_record_count = partitioned.iter().filter(|r| r.is_npd).count();
        let kpi = Self::kpi_from_total(&total, npd_record_count);

        // 4. 排名与洞察
        let sorted = InsightSelector::sort_descending(&groups, query.rank_measure);
        let top = InsightSelector::top_n(&groups, query.rank_measure, query.top_n);
        let best_performer =
            InsightSelector::best(&groups, RankMeasure::RejectionPercentage).cloned();
        let worst_performer =
            InsightSelector::worst(&groups, RankMeasure::RejectionPercentage).cloned();
        let alerts = InsightSelector::alerts(
            &groups,
            RankMeasure::RejectionPercentage,
            profile.rejection_alert_threshold_pct,
        );

        // 5. 缺陷分布 / 班次 / 日趋势
        let rejection_breakdown = Self::rejection_breakdown(&total);
        let keep_all = GroupingAggregator::new(
            profile,
            AggregateOptions {
                drop_inactive: false,
                cost_per_unit,
            },
        );
        let shift_split = keep_all.aggregate(partitioned.iter().copied(), GroupField::Shift);
        let daily_trend = Self::daily_trend(&keep_all, &partitioned);

        tracing::info!(
            run_id = %run_id,
            department = %profile.department,
            npd_mode = %query.npd_mode,
            group_by = %query.group_by,
            record_count = records.len(),
            partitioned_count = partitioned.len(),
            group_count = groups.len(),
            alert_count = alerts.len(),
            "部门看板计算完成"
        );

        DashboardReport {
            run_id,
            department: profile.department,
            npd_mode: query.npd_mode,
            group_by: query.group_by,
            rank_measure: query.rank_measure,
            kpi,
            groups: sorted,
            top,
            best_performer,
            worst_performer,
            alerts,
            alert_threshold_pct: profile.rejection_alert_threshold_pct,
            rejection_breakdown,
            shift_split,
            daily_trend,
        }
    }

    fn kpi_from_total(total: &GroupAggregate, npd_record_count: usize) -> KpiSummary {
        KpiSummary {
            record_count: total.record_count,
            npd_record_count,
            production: total.production,
            target: total.target,
            achievement_percentage: total.achievement_percentage,
            rejection: total.rejection,
            rejection_percentage: total.rejection_percentage,
            rejection_ppm: total.rejection_ppm,
            rework: total.rework,
            rework_percentage: total.rework_percentage,
            weight_kg: total.weight_kg,
            cost: total.cost,
            unique_units: total.units,
            electricity_cost: total.electricity_cost,
            cost_per_kg: total.cost_per_kg,
        }
    }

    /// 非零缺陷类别，按数量降序
    fn rejection_breakdown(total: &GroupAggregate) -> Vec<CategoryShare> {
        let mut shares: Vec<CategoryShare> = total
            .rejection_by_category
            .iter()
            .filter(|(_, qty)| **qty != 0.0)
            .map(|(category, qty)| CategoryShare {
                category: category.clone(),
                quantity: *qty,
                share_percentage: yield_calc::percentage(*qty, total.rejection),
            })
            .collect();
        shares.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
        shares
    }

    /// 按日期升序的趋势（无法解析的日期保留原文，空日期归入 Unknown）
    fn daily_trend(aggregator: &GroupingAggregator<'_>, records: &[&NormalizedRecord]) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = aggregator
            .aggregate_by(records.iter().copied(), |r| match r.date {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => r.group_key_or_unknown(GroupField::Date).to_string(),
            })
            .into_iter()
            .map(|agg| TrendPoint {
                date: agg.key,
                production: agg.production,
                rejection: agg.rejection,
                rejection_percentage: agg.rejection_percentage,
            })
            .collect();

        points.sort_by(|a, b| match (a.date == UNKNOWN_KEY, b.date == UNKNOWN_KEY) {
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            _ => a.date.cmp(&b.date),
        });
        points
    }
}
