// ==========================================
// 锻造 ERP 产量对账引擎 - 口径公式
// ==========================================
// 职责: 定义单条记录上的派生口径（重量 / 金额）
// 红线: 分组合计与总计必须使用同一公式，不做二次换算
// ==========================================

use crate::domain::record::NormalizedRecord;
use serde::{Deserialize, Serialize};

/// 单条记录口径公式
///
/// 配置中以 `{"kind": "product", "left": "slug_weight", "right": "production"}` 的形式出现。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasureFormula {
    /// 恒为 0（该部门无此口径）
    #[default]
    Zero,

    /// 单字段
    Field { field: String },

    /// 多字段求和
    SumOf { fields: Vec<String> },

    /// 两字段相乘（如 单重 × 数量）
    Product { left: String, right: String },

    /// 两字段相乘再乘以系数（如 克 → 千克）
    ScaledProduct {
        left: String,
        right: String,
        scale: f64,
    },
}

impl MeasureFormula {
    pub fn field(name: &str) -> Self {
        MeasureFormula::Field {
            field: name.to_string(),
        }
    }

    pub fn sum_of(names: &[&str]) -> Self {
        MeasureFormula::SumOf {
            fields: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn product(left: &str, right: &str) -> Self {
        MeasureFormula::Product {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// 公式引用的字段名（供归一化器收集数值字段）
    pub fn fields(&self) -> Vec<&str> {
        match self {
            MeasureFormula::Zero => Vec::new(),
            MeasureFormula::Field { field } => vec![field.as_str()],
            MeasureFormula::SumOf { fields } => fields.iter().map(String::as_str).collect(),
            MeasureFormula::Product { left, right }
            | MeasureFormula::ScaledProduct { left, right, .. } => {
                vec![left.as_str(), right.as_str()]
            }
        }
    }

    /// 在单条记录上求值
    pub fn evaluate(&self, record: &NormalizedRecord) -> f64 {
        let value = match self {
            MeasureFormula::Zero => 0.0,
            MeasureFormula::Field { field } => record.measure(field),
            MeasureFormula::SumOf { fields } => fields.iter().map(|f| record.measure(f)).sum(),
            MeasureFormula::Product { left, right } => record.measure(left) * record.measure(right),
            MeasureFormula::ScaledProduct { left, right, scale } => {
                record.measure(left) * record.measure(right) * scale
            }
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}
