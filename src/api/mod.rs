// ==========================================
// 灌区配水决策支持系统 - API 层
// ==========================================
// 职责: 鉴权、输入校验、错误转换，供界面或命令行调用
// ==========================================

pub mod allocation_api;
pub mod auth;
pub mod dashboard_api;
pub mod district_api;
pub mod error;
pub mod risk_api;
pub mod validator;

// 重导出核心类型
pub use allocation_api::AllocationApi;
pub use auth::{Actor, ActorRole};
pub use dashboard_api::{DashboardApi, DashboardOverview};
pub use district_api::DistrictApi;
pub use error::{ApiError, ApiResult};
pub use risk_api::RiskApi;
