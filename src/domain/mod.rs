// ==========================================
// 灌区配水决策支持系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod district;
pub mod risk;
pub mod types;

// 重导出核心类型
pub use allocation::{
    AllocationPlan, ParamValue, SimulationParameters, SimulationRecord, SimulationResults,
    SimulationStatus,
};
pub use district::{District, NewDistrict};
pub use risk::{
    CropStage, LatestRiskAssessment, RainfallOutlook, RiskAssessment, RiskDistribution,
    RiskFactors, TemperatureOutlook,
};
pub use types::{AllocationPriority, RiskLevel};
