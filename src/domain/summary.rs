// ==========================================
// 锻造 ERP 产量对账引擎 - 汇总与报表对象
// ==========================================
// 职责: 阶段合计 / 收得率汇总 / 部门 KPI / 看板报表 / 钢材对账报表
// 红线: 所有比率字段零保护，不输出 NaN/Infinity
// ==========================================

use crate::domain::aggregate::GroupAggregate;
use crate::domain::types::{Department, GroupField, NpdMode, RankMeasure, Stage};
use serde::{Deserialize, Serialize};

// ==========================================
// StageTotals - 四阶段合计（收得率计算输入）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageTotals {
    pub raw_material_weight_kg: f64,
    pub planned_weight_kg: f64,
    pub production_weight_kg: f64,
    pub dispatch_weight_kg: f64,
    pub dispatch_value: f64,
    /// 去重后的能耗（度）
    pub unique_units: f64,
}

// ==========================================
// YieldSummary - 收得率汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YieldSummary {
    pub raw_material_weight_kg: f64,
    pub planned_weight_kg: f64,
    pub production_weight_kg: f64,
    pub dispatch_weight_kg: f64,
    pub dispatch_value: f64,
    pub unique_units: f64,
    pub electricity_cost: f64,
    pub cost_per_kg: f64,

    // ===== 五个两两收得率（%） =====
    pub yield_planned_vs_raw: f64,
    pub yield_production_vs_raw: f64,
    pub yield_production_vs_planned: f64,
    pub yield_dispatch_vs_raw: f64,
    pub yield_dispatch_vs_production: f64,
}

// ==========================================
// KpiSummary - 部门 KPI
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiSummary {
    pub record_count: usize,
    pub npd_record_count: usize,
    pub production: f64,
    pub target: f64,
    pub achievement_percentage: f64,
    pub rejection: f64,
    pub rejection_percentage: f64,
    pub rejection_ppm: u64,
    pub rework: f64,
    pub rework_percentage: f64,
    pub weight_kg: f64,
    pub cost: f64,
    pub unique_units: f64,
    pub electricity_cost: f64,
    pub cost_per_kg: f64,
}

/// 单个缺陷类别的废品数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub quantity: f64,
    /// 占总废品比例（%）
    pub share_percentage: f64,
}

/// 日趋势点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub production: f64,
    pub rejection: f64,
    pub rejection_percentage: f64,
}

// ==========================================
// DashboardReport - 部门看板
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub run_id: String,
    pub department: Department,
    pub npd_mode: NpdMode,
    pub group_by: GroupField,
    pub rank_measure: RankMeasure,
    pub kpi: KpiSummary,
    /// 按排名口径降序的分组列表（图表用）
    pub groups: Vec<GroupAggregate>,
    pub top: Vec<GroupAggregate>,
    pub best_performer: Option<GroupAggregate>,
    pub worst_performer: Option<GroupAggregate>,
    pub alerts: Vec<GroupAggregate>,
    pub alert_threshold_pct: f64,
    pub rejection_breakdown: Vec<CategoryShare>,
    pub shift_split: Vec<GroupAggregate>,
    pub daily_trend: Vec<TrendPoint>,
}

// ==========================================
// 钢材对账
// ==========================================

/// 单炉号对账行
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatReconciliationRow {
    pub heat_no: String,
    pub raw_material_weight_kg: f64,
    pub planned_weight_kg: f64,
    pub production_weight_kg: f64,
    pub dispatch_weight_kg: f64,
    pub dispatch_value: f64,
    pub yield_planned_vs_raw: f64,
    pub yield_production_vs_raw: f64,
    pub yield_production_vs_planned: f64,
    pub yield_dispatch_vs_raw: f64,
    pub yield_dispatch_vs_production: f64,
    pub components: Vec<String>,
    pub invoices: Vec<String>,
    pub stages_present: Vec<Stage>,
}

/// 钢材对账报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: String,
    pub npd_mode: NpdMode,
    pub summary: YieldSummary,
    pub rows: Vec<HeatReconciliationRow>,
    /// 下游有数据但无原材料入库的炉号
    pub heats_missing_raw_material: Vec<String>,
    /// 发货重量超过生产重量的炉号
    pub over_dispatched_heats: Vec<String>,
}
