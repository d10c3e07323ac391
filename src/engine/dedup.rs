// ==========================================
// 锻造 ERP 产量对账引擎 - 能耗去重器
// ==========================================
// 同一生产槽位（日期/班次/炉号或产线/工序）在多条记录中重复出现时，
// 能耗只计一次，取各记录中的最大值。
// 总能耗 = 去重表合计，绝不对原始记录能耗字段直接求和。
// ==========================================

use crate::domain::aggregate::{UniqueUnitMap, UnitKey};
use crate::domain::record::NormalizedRecord;
use crate::domain::types::GroupField;

#[derive(Debug, Clone)]
pub struct UniqueUnitDeduplicator {
    key_fields: Vec<GroupField>,
    unit_field: String,
}

impl UniqueUnitDeduplicator {
    pub fn new(key_fields: Vec<GroupField>, unit_field: impl Into<String>) -> Self {
        Self {
            key_fields,
            unit_field: unit_field.into(),
        }
    }

    /// 构造槽位键
    pub fn key_of(&self, record: &NormalizedRecord) -> UnitKey {
        UnitKey(
            self.key_fields
                .iter()
                .map(|f| record.group_key(*f).map(str::to_string))
                .collect(),
        )
    }

    /// 单条记录上的能耗读数
    pub fn units_of(&self, record: &NormalizedRecord) -> f64 {
        record.measure(&self.unit_field)
    }

    /// 将单条记录计入去重表
    pub fn observe(&self, map: &mut UniqueUnitMap, record: &NormalizedRecord) {
        map.observe(self.key_of(record), self.units_of(record));
    }

    /// 对记录集去重
    pub fn dedup_units<'a, I>(&self, records: I) -> UniqueUnitMap
    where
        I: IntoIterator<Item = &'a NormalizedRecord>,
    {
        let mut map = UniqueUnitMap::new();
        let mut observed = 0usize;
        for record in records {
            self.observe(&mut map, record);
            observed += 1;
        }
        tracing::debug!(
            unit_field = %self.unit_field,
            observed,
            unique_slots = map.len(),
            "能耗去重完成"
        );
        map
    }
}
