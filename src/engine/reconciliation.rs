// ==========================================
// 锻造 ERP 产量对账引擎 - 钢材对账引擎
// ==========================================
// 四阶段: 原材料入库 → 计划 → 生产 → 发货
// 流程: 分阶段归一化 → NPD 分区（原材料除外）→ 阶段合计 → 收得率 → 按炉号对账
// 红线: 能耗只取生产阶段去重表合计
// 红线: 炉号连接键 TRIM + UPPER，缺失归入 Unknown
// ==========================================

use crate::config::reconciliation_profile::{ReconciliationProfile, StageProfile};
use crate::domain::record::{NormalizedRecord, RawRecord, UNKNOWN_KEY};
use crate::domain::summary::{HeatReconciliationRow, ReconciliationReport, StageTotals};
use crate::domain::types::{GroupField, NpdMode, Stage};
use crate::engine::dedup::UniqueUnitDeduplicator;
use crate::engine::normalizer::RecordNormalizer;
use crate::engine::partitioner::NpdPartitioner;
use crate::engine::yield_calc::{self, YieldCalculator};
use crate::importer::data_cleaner::DataCleaner;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// 四阶段原始记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecords {
    #[serde(default)]
    pub raw_material: Vec<RawRecord>,
    #[serde(default)]
    pub planned: Vec<RawRecord>,
    #[serde(default)]
    pub production: Vec<RawRecord>,
    #[serde(default)]
    pub dispatch: Vec<RawRecord>,
}

impl StageRecords {
    pub fn is_empty(&self) -> bool {
        self.raw_material.is_empty()
            && self.planned.is_empty()
            && self.production.is_empty()
            && self.dispatch.is_empty()
    }
}

/// 炉号累加器（内部使用）
#[derive(Default)]
struct HeatAccumulator {
    row: HeatReconciliationRow,
    components: BTreeSet<String>,
    invoices: BTreeSet<String>,
    stages: BTreeSet<Stage>,
}

// ==========================================
// SteelReconciliationEngine - 钢材对账引擎
// ==========================================
pub struct SteelReconciliationEngine;

impl SteelReconciliationEngine {
    pub fn reconcile(
        records: &StageRecords,
        profile: &ReconciliationProfile,
        npd_mode: NpdMode,
        cost_per_unit: f64,
    ) -> ReconciliationReport {
        let run_id = Uuid::new_v4().to_string();

        // 1. 分阶段归一化
        let raw_material = Self::normalize_stage(&records.raw_material, &profile.raw_material);
        let planned = Self::normalize_stage(&records.planned, &profile.planned);
        let production = Self::normalize_stage(&records.production, &profile.production);
        let dispatch = Self::normalize_stage(&records.dispatch, &profile.dispatch);

        // 2. NPD 分区（原材料入库不带组件号，不分区）
        let raw_material: Vec<&NormalizedRecord> = raw_material.iter().collect();
        let planned = NpdPartitioner::partition(&planned, npd_mode);
        let production = NpdPartitioner::partition(&production, npd_mode);
        let dispatch = NpdPartitioner::partition(&dispatch, npd_mode);

        // 3. 阶段合计
        let unique_units = match &profile.production.unit_field {
            Some(field) => UniqueUnitDeduplicator::new(
                profile.production.unit_key_fields.clone(),
                field.clone(),
            )
            .dedup_units(production.iter().copied())
            .total(),
            None => 0.0,
        };
        let totals = StageTotals {
            raw_material_weight_kg: Self::sum_weight(&raw_material, &profile.raw_material),
            planned_weight_kg: Self::sum_weight(&planned, &profile.planned),
            production_weight_kg: Self::sum_weight(&production, &profile.production),
            dispatch_weight_kg: Self::sum_weight(&dispatch, &profile.dispatch),
            dispatch_value: dispatch.iter().map(|r| profile.dispatch.value.evaluate(r)).sum(),
            unique_units,
        };
        let summary = YieldCalculator::compute_yields(&totals, cost_per_unit);

        // 4. 按炉号对账
        let mut heats: BTreeMap<String, HeatAccumulator> = BTreeMap::new();
        let stages: [(Stage, &[&NormalizedRecord], &StageProfile); 4] = [
            (Stage::RawMaterial, &raw_material, &profile.raw_material),
            (Stage::Planned, &planned, &profile.planned),
            (Stage::Production, &production, &profile.production),
            (Stage::Dispatch, &dispatch, &profile.dispatch),
        ];
        for (stage, stage_records, stage_profile) in stages {
            for record in stage_records {
                let acc = heats.entry(Self::heat_key(record)).or_default();
                Self::accumulate(acc, stage, record, stage_profile);
            }
        }

        let rows: Vec<HeatReconciliationRow> = heats
            .into_iter()
            .map(|(heat_no, acc)| Self::finalize_row(heat_no, acc))
            .collect();

        let heats_missing_raw_material: Vec<String> = rows
            .iter()
            .filter(|row| row.heat_no != UNKNOWN_KEY)
            .filter(|row| !row.stages_present.contains(&Stage::RawMaterial))
            .map(|row| row.heat_no.clone())
            .collect();
        let over_dispatched_heats: Vec<String> = rows
            .iter()
            .filter(|row| row.heat_no != UNKNOWN_KEY)
            .filter(|row| row.dispatch_weight_kg > row.production_weight_kg)
            .map(|row| row.heat_no.clone())
            .collect();

        if !over_dispatched_heats.is_empty() {
            tracing::warn!(
                run_id = %run_id,
                heats = ?over_dispatched_heats,
                "发货重量超过生产重量"
            );
        }
        tracing::info!(
            run_id = %run_id,
            npd_mode = %npd_mode,
            heat_count = rows.len(),
            missing_raw_material = heats_missing_raw_material.len(),
            over_dispatched = over_dispatched_heats.len(),
            yield_dispatch_vs_raw = summary.yield_dispatch_vs_raw,
            "钢材对账完成"
        );

        ReconciliationReport {
            run_id,
            npd_mode,
            summary,
            rows,
            heats_missing_raw_material,
            over_dispatched_heats,
        }
    }

    fn normalize_stage(records: &[RawRecord], profile: &StageProfile) -> Vec<NormalizedRecord> {
        RecordNormalizer::new(profile.numeric_fields()).normalize_all(records)
    }

    fn sum_weight(records: &[&NormalizedRecord], profile: &StageProfile) -> f64 {
        records.iter().map(|r| profile.weight.evaluate(r)).sum()
    }

    /// 炉号连接键
    fn heat_key(record: &NormalizedRecord) -> String {
        DataCleaner
            .clean_join_key(record.group_key(GroupField::HeatNo))
            .unwrap_or_else(|| UNKNOWN_KEY.to_string())
    }

    fn accumulate(
        acc: &mut HeatAccumulator,
        stage: Stage,
        record: &NormalizedRecord,
        profile: &StageProfile,
    ) {
        let weight = profile.weight.evaluate(record);
        match stage {
            Stage::RawMaterial => acc.row.raw_material_weight_kg += weight,
            Stage::Planned => acc.row.planned_weight_kg += weight,
            Stage::Production => acc.row.production_weight_kg += weight,
            Stage::Dispatch => {
                acc.row.dispatch_weight_kg += weight;
                acc.row.dispatch_value += profile.value.evaluate(record);
            }
        }
        acc.stages.insert(stage);
        if let Some(component) = record.component() {
            acc.components.insert(component.to_string());
        }
        if let Some(invoice) = record.group_key(GroupField::InvoiceNo) {
            acc.invoices.insert(invoice.to_string());
        }
    }

    fn finalize_row(heat_no: String, acc: HeatAccumulator) -> HeatReconciliationRow {
        let mut row = acc.row;
        row.heat_no = heat_no;
        row.yield_planned_vs_raw =
            yield_calc::percentage(row.planned_weight_kg, row.raw_material_weight_kg);
        row.yield_production_vs_raw =
            yield_calc::percentage(row.production_weight_kg, row.raw_material_weight_kg);
        row.yield_production_vs_planned =
            yield_calc::percentage(row.production_weight_kg, row.planned_weight_kg);
        row.yield_dispatch_vs_raw =
            yield_calc::percentage(row.dispatch_weight_kg, row.raw_material_weight_kg);
        row.yield_dispatch_vs_production =
            yield_calc::percentage(row.dispatch_weight_kg, row.production_weight_kg);
        row.components = acc.components.into_iter().collect();
        row.invoices = acc.invoices.into_iter().collect();
        row.stages_present = acc.stages.into_iter().collect();
        row
    }
}
