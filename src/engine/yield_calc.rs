// ==========================================
// 锻造 ERP 产量对账引擎 - 收得率/成本计算器
// ==========================================
// 职责: 阶段间收得率、吨钢电耗成本、废品率/PPM 等全部比率
// 红线: 分母 <= 0 时返回 0，任何比率不得输出 NaN/Infinity
// 口径: 废品率分母 = 产量 + 废品（投入件数），PPM = 废品率 × 10000
// ==========================================

use crate::domain::summary::{StageTotals, YieldSummary};

/// 百分比：100 × 分子 / 分母，零保护
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    guarded(100.0 * numerator, denominator)
}

/// 比值：分子 / 分母，零保护
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    guarded(numerator, denominator)
}

fn guarded(numerator: f64, denominator: f64) -> f64 {
    if denominator.is_nan() || denominator <= 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// 废品率（%）
pub fn rejection_percentage(production: f64, rejection: f64) -> f64 {
    percentage(rejection, production + rejection)
}

/// 废品 PPM
pub fn rejection_ppm(rejection_percentage: f64) -> u64 {
    let ppm = (rejection_percentage * 10_000.0).round();
    if ppm.is_finite() && ppm > 0.0 {
        ppm as u64
    } else {
        0
    }
}

/// 返工率（%），与废品率同一投入口径
pub fn rework_percentage(production: f64, rework: f64) -> f64 {
    percentage(rework, production + rework)
}

/// 达成率（%）
pub fn achievement_percentage(production: f64, target: f64) -> f64 {
    percentage(production, target)
}

/// 电费 = 去重能耗 × 单价
pub fn electricity_cost(unique_units: f64, cost_per_unit: f64) -> f64 {
    let cost = unique_units * cost_per_unit;
    if cost.is_finite() {
        cost
    } else {
        0.0
    }
}

/// 每公斤电费
pub fn cost_per_kg(electricity_cost: f64, weight_kg: f64) -> f64 {
    safe_ratio(electricity_cost, weight_kg)
}

// ==========================================
// YieldCalculator - 收得率计算器
// ==========================================
// 红线: 无状态，所有方法都是纯函数
pub struct YieldCalculator;

impl YieldCalculator {
    /// 由四阶段合计计算收得率汇总
    pub fn compute_yields(totals: &StageTotals, cost_per_unit: f64) -> YieldSummary {
        let electricity = electricity_cost(totals.unique_units, cost_per_unit);

        YieldSummary {
            raw_material_weight_kg: totals.raw_material_weight_kg,
            planned_weight_kg: totals.planned_weight_kg,
            production_weight_kg: totals.production_weight_kg,
            dispatch_weight_kg: totals.dispatch_weight_kg,
            dispatch_value: totals.dispatch_value,
            unique_units: totals.unique_units,
            electricity_cost: electricity,
            cost_per_kg: cost_per_kg(electricity, totals.production_weight_kg),
            yield_planned_vs_raw: percentage(
                totals.planned_weight_kg,
                totals.raw_material_weight_kg,
            ),
            yield_production_vs_raw: percentage(
                totals.production_weight_kg,
                totals.raw_material_weight_kg,
            ),
            yield_production_vs_planned: percentage(
                totals.production_weight_kg,
                totals.planned_weight_kg,
            ),
            yield_dispatch_vs_raw: percentage(
                totals.dispatch_weight_kg,
                totals.raw_material_weight_kg,
            ),
            yield_dispatch_vs_production: percentage(
                totals.dispatch_weight_kg,
                totals.production_weight_kg,
            ),
        }
    }
}
