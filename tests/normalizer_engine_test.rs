// ==========================================
// RecordNormalizer / NpdPartitioner 集成测试
// ==========================================
// 测试目标: 缺失值强转、NPD 识别、分区完备性
// ==========================================

mod helpers;

use helpers::test_data_builder::{forging_sample, RecordBuilder};
use std::collections::HashSet;
use steel_recon::config::DepartmentProfile;
use steel_recon::domain::types::{Department, GroupField, NpdMode};
use steel_recon::domain::NormalizedRecord;
use steel_recon::engine::{NpdPartitioner, RecordNormalizer};

// ==========================================
// 测试辅助函数
// ==========================================

fn forging_normalizer() -> RecordNormalizer {
    RecordNormalizer::for_profile(&DepartmentProfile::default_for(Department::Forging))
}

// ==========================================
// 归一化
// ==========================================

#[test]
fn test_missing_and_malformed_numbers_become_zero() {
    let record = RecordBuilder::new()
        .component("A")
        .text("production", "abc")
        .null("target")
        .text("up_setting", "")
        .number("overheat", 3.0)
        .build();

    let normalized = forging_normalizer().normalize(&record);

    assert_eq!(normalized.measure("production"), 0.0);
    assert_eq!(normalized.measure("target"), 0.0);
    assert_eq!(normalized.measure("up_setting"), 0.0);
    assert_eq!(normalized.measure("overheat"), 3.0);
    // 从未声明的字段同样为 0
    assert_eq!(normalized.measure("no_such_field"), 0.0);
    assert!(normalized.defaulted_fields >= 3);
}

#[test]
fn test_numeric_strings_are_parsed() {
    let record = RecordBuilder::new()
        .component("A")
        .text("production", " 120 ")
        .text("slug_weight", "2.5")
        .build();
    let normalized = forging_normalizer().normalize(&record);
    assert_eq!(normalized.measure("production"), 120.0);
    assert_eq!(normalized.measure("slug_weight"), 2.5);
}

#[test]
fn test_npd_suffix_is_case_sensitive() {
    let normalizer = forging_normalizer();
    let npd = normalizer.normalize(&RecordBuilder::new().component("RING-NPD").build());
    let lower = normalizer.normalize(&RecordBuilder::new().component("RING-npd").build());
    let missing = normalizer.normalize(&RecordBuilder::new().build());

    assert!(npd.is_npd);
    assert!(!lower.is_npd);
    assert!(!missing.is_npd);
}

#[test]
fn test_npd_suffix_checked_before_trim() {
    let normalizer = forging_normalizer();
    let trailing = normalizer.normalize(&RecordBuilder::new().component("X-NPD ").build());
    let leading = normalizer.normalize(&RecordBuilder::new().component(" X-NPD").build());

    assert!(!trailing.is_npd);
    assert_eq!(trailing.component(), Some("X-NPD"));
    assert!(leading.is_npd);
}

#[test]
fn test_attributes_trimmed_and_shift_lowercased() {
    let record = RecordBuilder::new()
        .component("  A  ")
        .text("shift", "NIGHT")
        .text("heat_number", "h-77")
        .build();
    let normalized = forging_normalizer().normalize(&record);
    assert_eq!(normalized.group_key(GroupField::Component), Some("A"));
    assert_eq!(normalized.group_key(GroupField::Shift), Some("night"));
    assert_eq!(normalized.group_key(GroupField::HeatNo), Some("h-77"));
    assert_eq!(normalized.group_key_or_unknown(GroupField::Customer), "Unknown");
}

// ==========================================
// NPD 分区
// ==========================================

#[test]
fn test_partition_modes() {
    let records = forging_normalizer().normalize_all(&forging_sample());

    let regular = NpdPartitioner::partition(&records, NpdMode::Regular);
    let only = NpdPartitioner::partition(&records, NpdMode::Only);
    let include = NpdPartitioner::partition(&records, NpdMode::Include);

    assert_eq!(regular.len(), 2);
    assert_eq!(only.len(), 1);
    assert_eq!(include.len(), 3);
    assert!(regular.iter().all(|r| !r.is_npd));
    assert!(only.iter().all(|r| r.is_npd));
}

#[test]
fn test_partition_completeness() {
    let mut raw = forging_sample();
    raw.push(RecordBuilder::new().production(1.0).build());
    raw.push(RecordBuilder::new().component("X-NPD").build());
    let records = forging_normalizer().normalize_all(&raw);

    let regular = NpdPartitioner::partition(&records, NpdMode::Regular);
    let only = NpdPartitioner::partition(&records, NpdMode::Only);
    let include = NpdPartitioner::partition(&records, NpdMode::Include);

    assert_eq!(regular.len() + only.len(), include.len());

    // 以地址比较，验证两个分区恰好覆盖全集且不相交
    let addr = |r: &&NormalizedRecord| (*r as *const NormalizedRecord) as usize;
    let regular_set: HashSet<usize> = regular.iter().map(addr).collect();
    let only_set: HashSet<usize> = only.iter().map(addr).collect();
    let include_set: HashSet<usize> = include.iter().map(addr).collect();

    assert!(regular_set.is_disjoint(&only_set));
    let union: HashSet<usize> = regular_set.union(&only_set).copied().collect();
    assert_eq!(union, include_set);
}

#[test]
fn test_partition_empty() {
    assert!(NpdPartitioner::partition(&[], NpdMode::Include).is_empty());
}
