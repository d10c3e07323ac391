// ==========================================
// 锻造 ERP 产量对账引擎 - NPD 分区器
// ==========================================
// Regular: 仅量产件 / Only: 仅 NPD 件 / Include: 全部
// 红线: Regular 与 Only 互斥且并集等于 Include
// ==========================================

use crate::domain::record::NormalizedRecord;
use crate::domain::types::NpdMode;

pub struct NpdPartitioner;

impl NpdPartitioner {
    /// 按模式筛选记录（保持原顺序）
    pub fn partition(records: &[NormalizedRecord], mode: NpdMode) -> Vec<&NormalizedRecord> {
        records.iter().filter(|r| Self::accepts(r, mode)).collect()
    }

    /// 单条记录是否落入该模式
    pub fn accepts(record: &NormalizedRecord, mode: NpdMode) -> bool {
        match mode {
            NpdMode::Regular => !record.is_npd,
            NpdMode::Only => record.is_npd,
            NpdMode::Include => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(component: &str, is_npd: bool) -> NormalizedRecord {
        let mut rec = NormalizedRecord::default();
        rec.attributes
            .insert(crate::domain::types::GroupField::Component, component.to_string());
        rec.is_npd = is_npd;
        rec
    }

    #[test]
    fn test_modes() {
        let records = vec![
            record("A", false),
            record("B-NPD", true),
            record("C", false),
        ];

        let regular = NpdPartitioner::partition(&records, NpdMode::Regular);
        let only = NpdPartitioner::partition(&records, NpdMode::Only);
        let all = NpdPartitioner::partition(&records, NpdMode::Include);

        assert_eq!(regular.len(), 2);
        assert_eq!(only.len(), 1);
        assert_eq!(all.len(), 3);
        assert_eq!(only[0].component(), Some("B-NPD"));
        assert_eq!(regular[1].component(), Some("C"));
    }

    #[test]
    fn test_empty_input() {
        assert!(NpdPartitioner::partition(&[], NpdMode::Include).is_empty());
    }
}
