// ==========================================
// 灌区配水决策支持系统 - 引擎层持久化接口
// ==========================================
// 说明: Engine 层定义 trait，Repository 层实现
// 引擎只写入结果，从不回读自己的历史输出
// ==========================================

use crate::domain::allocation::SimulationRecord;
use crate::domain::risk::RiskAssessment;
use crate::repository::error::RepositoryResult;

/// 风险评估记录写入接口
pub trait RiskAssessmentStore: Send + Sync {
    /// 追加一条评估记录
    fn insert_risk_assessment(&self, assessment: &RiskAssessment) -> RepositoryResult<()>;
}

/// 配水模拟记录写入接口
///
/// # 实现说明
/// - `SimulationRepository` 为 SQLite 实现
/// - 插入只追加，并发插入互不影响
pub trait SimulationStore: Send + Sync {
    /// 追加一条模拟记录
    fn insert_simulation_record(&self, record: &SimulationRecord) -> RepositoryResult<()>;
}
