// ==========================================
// 灌区配水决策支持系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (配水方案由人工最终确认)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 风险分级与配水计算
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllocationPriority, RiskLevel};

// 领域实体
pub use domain::{
    AllocationPlan, District, RiskAssessment, RiskFactors, SimulationRecord, SimulationResults,
};

// 引擎
pub use engine::{AllocationSimulator, RiskAssessor, WaterSignalSampler};

// API
pub use api::{AllocationApi, DashboardApi, DistrictApi, RiskApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "灌区配水决策支持系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
