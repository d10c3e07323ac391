// ==========================================
// 锻造 ERP 产量对账引擎 - 分组聚合对象
// ==========================================
// GroupAggregate: 按分类字段聚合的运行合计
// UnitKey / UniqueUnitMap: 能耗去重槽位
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// GroupAggregate - 分组聚合
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupAggregate {
    /// 分组键（空值为 "Unknown"）
    pub key: String,

    /// 记录条数
    pub record_count: usize,

    /// 产量（件）
    pub production: f64,

    /// 目标（件）
    pub target: f64,

    /// 废品合计（件）
    pub rejection: f64,

    /// 返工合计（件）
    pub rework: f64,

    /// 重量（kg）
    pub weight_kg: f64,

    /// 金额/成本
    pub cost: f64,

    /// 去重后的能耗（度）
    pub units: f64,

    /// 分缺陷废品数
    pub rejection_by_category: BTreeMap<String, f64>,

    /// 分类别返工数
    pub rework_by_category: BTreeMap<String, f64>,

    // ===== 派生比率（聚合器填充，全部零保护） =====
    pub rejection_percentage: f64,
    pub rejection_ppm: u64,
    pub rework_percentage: f64,
    pub achievement_percentage: f64,
    pub electricity_cost: f64,
    pub cost_per_kg: f64,
}

impl GroupAggregate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

// ==========================================
// UnitKey - 能耗槽位键
// ==========================================
// 结构化元组键（日期/班次/炉号或产线/工序），不做字符串拼接
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey(pub Vec<Option<String>>);

/// 单个槽位的代表能耗值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueUnitEntry {
    pub key: UnitKey,
    /// 槽位内各记录能耗的最大值
    pub units: f64,
    /// 共享该槽位的记录条数
    pub source_count: usize,
}

// ==========================================
// UniqueUnitMap - 去重能耗表
// ==========================================
// 保持首次出现顺序，便于测试断言
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniqueUnitMap {
    entries: Vec<UniqueUnitEntry>,
    index: HashMap<UnitKey, usize>,
}

impl UniqueUnitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次观测，同键取最大值
    pub fn observe(&mut self, key: UnitKey, units: f64) {
        let units = if units.is_finite() { units.max(0.0) } else { 0.0 };
        match self.index.get(&key) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                entry.source_count += 1;
                if units > entry.units {
                    entry.units = units;
                }
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(UniqueUnitEntry {
                    key,
                    units,
                    source_count: 1,
                });
            }
        }
    }

    pub fn get(&self, key: &UnitKey) -> Option<f64> {
        self.index.get(key).map(|&pos| self.entries[pos].units)
    }

    /// 去重后的能耗合计
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.units).sum()
    }

    pub fn entries(&self) -> &[UniqueUnitEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
