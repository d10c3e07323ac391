// ==========================================
// 锻造 ERP 产量对账引擎 - 领域类型定义
// ==========================================
// 职责: NPD 模式 / 部门 / 分组字段 / 排名口径 / 工序阶段
// 序列化格式: snake_case (与 REST 接口字段一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// NPD 过滤模式 (NPD Mode)
// ==========================================
// 默认 Regular: 看板默认只看量产件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpdMode {
    #[default]
    Regular, // 仅量产件
    Only,    // 仅 NPD 件
    Include, // 全部
}

impl NpdMode {
    /// 严格解析，未知值返回 None
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Some(NpdMode::Regular),
            "only" => Some(NpdMode::Only),
            "include" => Some(NpdMode::Include),
            _ => None,
        }
    }

    /// 宽松解析：未知值显式回落到 Regular
    pub fn parse_or_default(s: &str) -> Self {
        match Self::from_str(s) {
            Some(mode) => mode,
            None => {
                tracing::warn!(value = s, "未知 NPD 模式，回落为 regular");
                NpdMode::Regular
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NpdMode::Regular => "regular",
            NpdMode::Only => "only",
            NpdMode::Include => "include",
        }
    }
}

impl fmt::Display for NpdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 部门 (Department)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Forging,         // 锻造
    HeatTreatment,   // 热处理
    PreMachining,    // 粗加工
    Machining,       // 机加工 (CNC)
    FinalInspection, // 终检
    Marking,         // 打标
    Visual,          // 外观检验
    Dispatch,        // 发货
    RawMaterial,     // 原材料
}

impl Department {
    pub const ALL: [Department; 9] = [
        Department::Forging,
        Department::HeatTreatment,
        Department::PreMachining,
        Department::Machining,
        Department::FinalInspection,
        Department::Marking,
        Department::Visual,
        Department::Dispatch,
        Department::RawMaterial,
    ];

    /// 从字符串解析部门（兼容连字符/空格写法）
    pub fn from_str(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "forging" => Some(Department::Forging),
            "heat_treatment" | "ht" => Some(Department::HeatTreatment),
            "pre_machining" | "pre_mc" => Some(Department::PreMachining),
            "machining" | "cnc" => Some(Department::Machining),
            "final_inspection" | "fi" => Some(Department::FinalInspection),
            "marking" => Some(Department::Marking),
            "visual" => Some(Department::Visual),
            "dispatch" => Some(Department::Dispatch),
            "raw_material" => Some(Department::RawMaterial),
            _ => None,
        }
    }

    /// 配置键使用的名称
    pub fn as_key(&self) -> &'static str {
        match self {
            Department::Forging => "forging",
            Department::HeatTreatment => "heat_treatment",
            Department::PreMachining => "pre_machining",
            Department::Machining => "machining",
            Department::FinalInspection => "final_inspection",
            Department::Marking => "marking",
            Department::Visual => "visual",
            Department::Dispatch => "dispatch",
            Department::RawMaterial => "raw_material",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

// ==========================================
// 分组字段 (Group Field)
// ==========================================
// 记录上的分类字段全集；各部门允许的分组字段是其子集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Component,
    Customer,
    Date,
    Shift,
    Line,
    Furnace,
    Process,
    ShopFloor,
    BatchNumber,
    HeatNo,
    InvoiceNo,
    Machine,
    Supplier,
    Grade,
}

impl GroupField {
    pub const ALL: [GroupField; 14] = [
        GroupField::Component,
        GroupField::Customer,
        GroupField::Date,
        GroupField::Shift,
        GroupField::Line,
        GroupField::Furnace,
        GroupField::Process,
        GroupField::ShopFloor,
        GroupField::BatchNumber,
        GroupField::HeatNo,
        GroupField::InvoiceNo,
        GroupField::Machine,
        GroupField::Supplier,
        GroupField::Grade,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.source_keys().contains(&key.as_str()))
    }

    pub fn as_str(&self) -> &'static str {
        self.source_keys()[0]
    }

    /// 记录中可能出现的字段名（首个为规范名，其余为别名）
    pub fn source_keys(&self) -> &'static [&'static str] {
        match self {
            GroupField::Component => &["component"],
            GroupField::Customer => &["customer"],
            GroupField::Date => &["date"],
            GroupField::Shift => &["shift"],
            GroupField::Line => &["line"],
            GroupField::Furnace => &["furnace"],
            GroupField::Process => &["process"],
            GroupField::ShopFloor => &["shop_floor"],
            GroupField::BatchNumber => &["batch_number"],
            GroupField::HeatNo => &["heat_no", "heat_number"],
            GroupField::InvoiceNo => &["invoice_no", "invoice_number"],
            GroupField::Machine => &["machine"],
            GroupField::Supplier => &["supplier"],
            GroupField::Grade => &["grade"],
        }
    }
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 排名口径 (Rank Measure)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMeasure {
    Production,
    Target,
    Rejection,
    Rework,
    WeightKg,
    Cost,
    Units,
    RecordCount,
    RejectionPercentage,
    ReworkPercentage,
    AchievementPercentage,
    CostPerKg,
}

impl RankMeasure {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" => Some(RankMeasure::Production),
            "target" => Some(RankMeasure::Target),
            "rejection" => Some(RankMeasure::Rejection),
            "rework" => Some(RankMeasure::Rework),
            "weight" | "weight_kg" => Some(RankMeasure::WeightKg),
            "cost" => Some(RankMeasure::Cost),
            "units" => Some(RankMeasure::Units),
            "record_count" | "count" => Some(RankMeasure::RecordCount),
            "rejection_percentage" => Some(RankMeasure::RejectionPercentage),
            "rework_percentage" => Some(RankMeasure::ReworkPercentage),
            "achievement_percentage" => Some(RankMeasure::AchievementPercentage),
            "cost_per_kg" => Some(RankMeasure::CostPerKg),
            _ => None,
        }
    }
}

// ==========================================
// 主口径 (Primary Measure)
// ==========================================
// 聚合后过滤"不活跃分组"时参考的口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryMeasure {
    #[default]
    Production,
    Rejection,
}

// ==========================================
// 对账阶段 (Stage)
// ==========================================
// 顺序: RawMaterial < Planned < Production < Dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RawMaterial, // 原材料入库
    Planned,     // 计划/批次分配
    Production,  // 生产
    Dispatch,    // 发货
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::RawMaterial => write!(f, "raw_material"),
            Stage::Planned => write!(f, "planned"),
            Stage::Production => write!(f, "production"),
            Stage::Dispatch => write!(f, "dispatch"),
        }
    }
}
