// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use serde_json::Value;
use steel_recon::domain::record::RawRecord;

// ==========================================
// RawRecord 构建器
// ==========================================

pub struct RecordBuilder {
    record: RawRecord,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            record: RawRecord::new(),
        }
    }

    /// 锻造记录（常用字段一次填齐）
    pub fn forging(component: &str, date: &str, shift: &str, line: &str) -> Self {
        Self::new()
            .text("component", component)
            .text("date", date)
            .text("shift", shift)
            .text("line", line)
            .text("process", "forging")
    }

    pub fn text(mut self, key: &str, value: &str) -> Self {
        self.record.insert(key, value);
        self
    }

    pub fn number(mut self, key: &str, value: f64) -> Self {
        self.record.insert(key, value);
        self
    }

    pub fn null(mut self, key: &str) -> Self {
        self.record.insert(key, Value::Null);
        self
    }

    pub fn component(self, component: &str) -> Self {
        self.text("component", component)
    }

    pub fn heat_no(self, heat_no: &str) -> Self {
        self.text("heat_no", heat_no)
    }

    pub fn production(self, qty: f64) -> Self {
        self.number("production", qty)
    }

    pub fn target(self, qty: f64) -> Self {
        self.number("target", qty)
    }

    pub fn slug_weight(self, kg: f64) -> Self {
        self.number("slug_weight", kg)
    }

    pub fn consumed_units(self, units: f64) -> Self {
        self.number("consumed_units", units)
    }

    pub fn build(self) -> RawRecord {
        self.record
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 常用数据集
// ==========================================

/// 锻造部门样例：A 组件两条量产记录 + 一条 NPD 记录
pub fn forging_sample() -> Vec<RawRecord> {
    vec![
        RecordBuilder::forging("A", "2025-03-01", "Day", "L1")
            .production(100.0)
            .target(120.0)
            .number("up_setting", 4.0)
            .slug_weight(2.5)
            .consumed_units(500.0)
            .build(),
        RecordBuilder::forging("A", "2025-03-02", "Night", "L1")
            .production(50.0)
            .target(60.0)
            .number("overheat", 6.0)
            .slug_weight(2.5)
            .consumed_units(300.0)
            .build(),
        RecordBuilder::forging("B-NPD", "2025-03-01", "Day", "L2")
            .production(20.0)
            .number("sizing", 5.0)
            .slug_weight(4.0)
            .consumed_units(80.0)
            .build(),
    ]
}
