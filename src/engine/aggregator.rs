// ==========================================
// 锻造 ERP 产量对账引擎 - 分组聚合器
// ==========================================
// 职责: 按分类字段分组，按部门口径表累加各口径
// 红线: 分组与总计使用同一单条记录公式（不做二次换算）
// 红线: 能耗先对全集去重，再按槽位内产量占比分摊到各分组，
//       各分组能耗之和 = 总计能耗
// 输出顺序: 分组键首次出现顺序（排序交给选择器）
// ==========================================

use crate::config::config_manager::DEFAULT_COST_PER_UNIT;
use crate::config::department_profile::DepartmentProfile;
use crate::domain::aggregate::{GroupAggregate, UniqueUnitMap, UnitKey};
use crate::domain::record::NormalizedRecord;
use crate::domain::types::{GroupField, PrimaryMeasure};
use crate::engine::dedup::UniqueUnitDeduplicator;
use crate::engine::yield_calc;
use std::collections::HashMap;

/// 聚合选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateOptions {
    /// 过滤主口径恰为 0 的分组
    pub drop_inactive: bool,
    /// 每度电成本
    pub cost_per_unit: f64,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            drop_inactive: true,
            cost_per_unit: DEFAULT_COST_PER_UNIT,
        }
    }
}

/// 槽位 → [(分组下标, 该分组在槽位内的产量)]
type SlotShares = HashMap<UnitKey, Vec<(usize, f64)>>;

// ==========================================
// GroupingAggregator - 分组聚合器
// ==========================================
pub struct GroupingAggregator<'p> {
    profile: &'p DepartmentProfile,
    options: AggregateOptions,
    dedup: Option<UniqueUnitDeduplicator>,
}

impl<'p> GroupingAggregator<'p> {
    pub fn new(profile: &'p DepartmentProfile, options: AggregateOptions) -> Self {
        let dedup = profile
            .unit_field
            .as_ref()
            .map(|field| UniqueUnitDeduplicator::new(profile.unit_key_fields.clone(), field.clone()));
        Self {
            profile,
            options,
            dedup,
        }
    }

    /// 按分组字段聚合（空值归入 "Unknown"）
    pub fn aggregate<'a, I>(&self, records: I, group_by: GroupField) -> Vec<GroupAggregate>
    where
        I: IntoIterator<Item = &'a NormalizedRecord>,
    {
        self.aggregate_by(records, |r| r.group_key_or_unknown(group_by).to_string())
    }

    /// 按任意键选择器聚合
    pub fn aggregate_by<'a, I, F>(&self, records: I, key_of: F) -> Vec<GroupAggregate>
    where
        I: IntoIterator<Item = &'a NormalizedRecord>,
        F: Fn(&NormalizedRecord) -> String,
    {
        let mut groups: Vec<GroupAggregate> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut units = UniqueUnitMap::new();
        let mut shares: SlotShares = HashMap::new();

        for record in records {
            let key = key_of(record);
            let pos = match index.get(&key) {
                Some(&pos) => pos,
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(GroupAggregate::new(key));
                    groups.len() - 1
                }
            };
            self.accumulate(&mut groups[pos], record);

            if let Some(dedup) = &self.dedup {
                let slot = dedup.key_of(record);
                units.observe(slot.clone(), dedup.units_of(record));
                let production = record.measure(&self.profile.production_field).max(0.0);
                let members = shares.entry(slot).or_default();
                match members.iter_mut().find(|(member, _)| *member == pos) {
                    Some(member) => member.1 += production,
                    None => members.push((pos, production)),
                }
            }
        }

        Self::allocate_units(&mut groups, &units, &shares);

        let total_groups = groups.len();
        let result: Vec<GroupAggregate> = groups
            .into_iter()
            .map(|agg| self.finalize(agg))
            .filter(|agg| !self.options.drop_inactive || self.is_active(agg))
            .collect();

        tracing::debug!(
            department = %self.profile.department,
            total_groups,
            kept_groups = result.len(),
            unique_slots = units.len(),
            "分组聚合完成"
        );
        result
    }

    /// 不分组的总计（不过滤）
    pub fn total<'a, I>(&self, records: I, key: &str) -> GroupAggregate
    where
        I: IntoIterator<Item = &'a NormalizedRecord>,
    {
        let mut agg = GroupAggregate::new(key);
        let mut units = UniqueUnitMap::new();
        for record in records {
            self.accumulate(&mut agg, record);
            if let Some(dedup) = &self.dedup {
                dedup.observe(&mut units, record);
            }
        }
        agg.units = units.total();
        self.finalize(agg)
    }

    /// 槽位能耗按槽位内产量占比分摊；槽位内产量全为 0 时整体计入首个分组
    fn allocate_units(groups: &mut [GroupAggregate], units: &UniqueUnitMap, shares: &SlotShares) {
        for entry in units.entries() {
            let Some(members) = shares.get(&entry.key) else {
                continue;
            };
            let slot_production: f64 = members.iter().map(|(_, production)| production).sum();
            if slot_production > 0.0 {
                for (pos, production) in members {
                    groups[*pos].units += entry.units * production / slot_production;
                }
            } else if let Some((pos, _)) = members.first() {
                groups[*pos].units += entry.units;
            }
        }
    }

    /// 单条记录贡献（能耗除外）
    fn accumulate(&self, agg: &mut GroupAggregate, record: &NormalizedRecord) {
        let profile = self.profile;

        agg.record_count += 1;
        agg.production += record.measure(&profile.production_field);
        if let Some(target) = &profile.target_field {
            agg.target += record.measure(target);
        }

        for field in &profile.rejection_fields {
            let qty = record.measure(field);
            agg.rejection += qty;
            *agg.rejection_by_category.entry(field.clone()).or_insert(0.0) += qty;
        }
        for field in &profile.rework_fields {
            let qty = record.measure(field);
            agg.rework += qty;
            *agg.rework_by_category.entry(field.clone()).or_insert(0.0) += qty;
        }

        agg.weight_kg += profile.weight.evaluate(record);
        agg.cost += profile.cost.evaluate(record);
    }

    /// 填充派生比率
    fn finalize(&self, mut agg: GroupAggregate) -> GroupAggregate {
        agg.rejection_percentage = yield_calc::rejection_percentage(agg.production, agg.rejection);
        agg.rejection_ppm = yield_calc::rejection_ppm(agg.rejection_percentage);
        agg.rework_percentage = yield_calc::rework_percentage(agg.production, agg.rework);
        agg.achievement_percentage = yield_calc::achievement_percentage(agg.production, agg.target);
        agg.electricity_cost = yield_calc::electricity_cost(agg.units, self.options.cost_per_unit);
        agg.cost_per_kg = yield_calc::cost_per_kg(agg.electricity_cost, agg.weight_kg);
        agg
    }

    fn is_active(&self, agg: &GroupAggregate) -> bool {
        match self.profile.primary_measure {
            PrimaryMeasure::Production => agg.production != 0.0,
            PrimaryMeasure::Rejection => agg.rejection != 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Department;

    fn forging_record(component: &str, line: &str, production: f64, up_setting: f64, units: f64) -> NormalizedRecord {
        let mut rec = NormalizedRecord::default();
        rec.attributes.insert(GroupField::Component, component.to_string());
        rec.attributes.insert(GroupField::Line, line.to_string());
        rec.attributes.insert(GroupField::Date, "2025-03-01".to_string());
        rec.attributes.insert(GroupField::Shift, "day".to_string());
        rec.measures.insert("production".to_string(), production);
        rec.measures.insert("up_setting".to_string(), up_setting);
        rec.measures.insert("slug_weight".to_string(), 2.0);
        rec.measures.insert("consumed_units".to_string(), units);
        rec
    }

    #[test]
    fn test_group_units_deduplicated_per_slot() {
        let profile = DepartmentProfile::default_for(Department::Forging);
        let aggregator = GroupingAggregator::new(&profile, AggregateOptions::default());
        // 同一产线同一班次两个组件：能耗只计一次
        let records = vec![
            forging_record("A", "L1", 100.0, 0.0, 500.0),
            forging_record("B", "L1", 50.0, 0.0, 500.0),
        ];
        let by_line = aggregator.aggregate(&records, GroupField::Line);
        assert_eq!(by_line.len(), 1);
        assert_eq!(by_line[0].units, 500.0);
        assert_eq!(by_line[0].weight_kg, 300.0);

        let total = aggregator.total(&records, "Total");
        assert_eq!(total.units, 500.0);
    }

    #[test]
    fn test_shared_slot_split_by_production() {
        let profile = DepartmentProfile::default_for(Department::Forging);
        let aggregator = GroupingAggregator::new(&profile, AggregateOptions::default());
        let records = vec![
            forging_record("A", "L1", 100.0, 0.0, 600.0),
            forging_record("B", "L1", 200.0, 0.0, 600.0),
        ];
        let groups = aggregator.aggregate(&records, GroupField::Component);
        assert_eq!(groups[0].units, 200.0);
        assert_eq!(groups[1].units, 400.0);
        assert_eq!(aggregator.total(&records, "Total").units, 600.0);
    }

    #[test]
    fn test_zero_production_slot_goes_to_first_group() {
        let profile = DepartmentProfile::default_for(Department::Forging);
        let options = AggregateOptions {
            drop_inactive: false,
            ..Default::default()
        };
        let aggregator = GroupingAggregator::new(&profile, options);
        let records = vec![
            forging_record("IDLE-A", "L1", 0.0, 0.0, 80.0),
            forging_record("IDLE-B", "L1", 0.0, 0.0, 50.0),
        ];
        let groups = aggregator.aggregate(&records, GroupField::Component);
        assert_eq!(groups[0].units, 80.0);
        assert_eq!(groups[1].units, 0.0);
    }

    #[test]
    fn test_group_weights_sum_to_total() {
        let profile = DepartmentProfile::default_for(Department::Forging);
        let aggregator = GroupingAggregator::new(&profile, AggregateOptions::default());
        let records = vec![
            forging_record("A", "L1", 100.0, 2.0, 0.0),
            forging_record("B", "L2", 40.0, 1.0, 0.0),
            forging_record("A", "L2", 10.0, 0.0, 0.0),
        ];
        let groups = aggregator.aggregate(&records, GroupField::Component);
        let total = aggregator.total(&records, "Total");
        let weight_sum: f64 = groups.iter().map(|g| g.weight_kg).sum();
        assert_eq!(weight_sum, total.weight_kg);
        assert_eq!(groups[0].key, "A");
        assert_eq!(groups[0].rejection_by_category.get("up_setting"), Some(&2.0));
    }

    #[test]
    fn test_inactive_groups_dropped_unless_disabled() {
        let profile = DepartmentProfile::default_for(Department::Forging);
        let records = vec![
            forging_record("A", "L1", 100.0, 0.0, 0.0),
            forging_record("IDLE", "L1", 0.0, 0.0, 0.0),
        ];

        let dropping = GroupingAggregator::new(&profile, AggregateOptions::default());
        assert_eq!(dropping.aggregate(&records, GroupField::Component).len(), 1);

        let keeping = GroupingAggregator::new(
            &profile,
            AggregateOptions {
                drop_inactive: false,
                ..Default::default()
            },
        );
        assert_eq!(keeping.aggregate(&records, GroupField::Component).len(), 2);
    }

    #[test]
    fn test_missing_key_goes_to_unknown() {
        let profile = DepartmentProfile::default_for(Department::Forging);
        let aggregator = GroupingAggregator::new(&profile, AggregateOptions::default());
        let records = vec![forging_record("A", "L1", 10.0, 0.0, 0.0)];
        let groups = aggregator.aggregate(&records, GroupField::Customer);
        assert_eq!(groups[0].key, "Unknown");
    }

    #[test]
    fn test_empty_records() {
        let profile = DepartmentProfile::default_for(Department::Forging);
        let aggregator = GroupingAggregator::new(&profile, AggregateOptions::default());
        assert!(aggregator.aggregate(&[], GroupField::Component).is_empty());
        let total = aggregator.total(&[], "Total");
        assert_eq!(total.record_count, 0);
        assert_eq!(total.rejection_percentage, 0.0);
    }
}
