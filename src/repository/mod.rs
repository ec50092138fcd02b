// ==========================================
// 灌区配水决策支持系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod district_repo;
pub mod error;
pub mod risk_repo;
pub mod simulation_repo;

// 重导出核心仓储
pub use district_repo::DistrictRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use risk_repo::RiskAssessmentRepository;
pub use simulation_repo::SimulationRepository;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;

/// 时间列存储格式 (微秒精度，保证同一秒内的记录可排序)
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// 解析时间列；兼容不带小数秒的旧数据
pub(crate) fn parse_datetime_column(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// 解析 JSON 列
pub(crate) fn parse_json_column<T: DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
