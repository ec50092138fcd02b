// ==========================================
// 灌区配水决策支持系统 - 引擎层错误类型
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
///
/// 计算本身不会失败；只有输入校验与持久化会产生错误。
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("持久化失败: {0}")]
    Storage(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
