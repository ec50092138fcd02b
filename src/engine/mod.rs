// ==========================================
// 灌区配水决策支持系统 - 引擎层
// ==========================================
// 职责: 风险分级、配水计算，不拼 SQL
// 红线: 引擎经由 store trait 写入结果，从不回读
// ==========================================

pub mod allocation;
pub mod error;
pub mod risk;
pub mod sampler;
pub mod store;

// 重导出核心引擎
pub use allocation::{
    allocation_recommendations, classify_priority, compute_allocation, AllocationComputation,
    AllocationSimulator, SimulationOutcome, SimulationRequest,
};
pub use error::{EngineError, EngineResult};
pub use risk::{build_assessment, classify_risk_score, risk_recommendation, RiskAssessor};
pub use sampler::{FixedSampler, RiskSignals, UniformSampler, WaterSignalSampler};
pub use store::{RiskAssessmentStore, SimulationStore};
