// ==========================================
// 灌区配水决策支持系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户可见的错误消息
// 约束: 计算失败只返回通用消息，内部原因仅写入日志
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 权限错误
    // ==========================================
    #[error("未登录: {0}")]
    Unauthorized(String),

    #[error("权限不足: {0}")]
    PermissionDenied(String),

    // ==========================================
    // 计算失败 (通用消息)
    // ==========================================
    #[error("风险评估失败")]
    AssessmentFailed,

    #[error("配水模拟失败")]
    SimulationFailed,

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 将引擎错误转换为评估失败（存储原因写日志）
    pub fn from_assessment_error(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::ValidationError(msg),
            EngineError::Storage(cause) => Self::from_assessment_storage(cause),
        }
    }

    /// 将引擎错误转换为模拟失败（存储原因写日志）
    pub fn from_simulation_error(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::ValidationError(msg),
            EngineError::Storage(cause) => Self::from_simulation_storage(cause),
        }
    }

    /// 评估流程中的仓储错误：NotFound 原样返回，其余写日志后返回通用消息
    pub fn from_assessment_storage(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::from(err),
            cause => {
                tracing::error!(error = %cause, "风险评估存储访问失败");
                ApiError::AssessmentFailed
            }
        }
    }

    /// 模拟流程中的仓储错误：NotFound 原样返回，其余写日志后返回通用消息
    pub fn from_simulation_storage(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::from(err),
            cause => {
                tracing::error!(error = %cause, "配水模拟存储访问失败");
                ApiError::SimulationFailed
            }
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }

            // 数据质量错误
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::ValidationError(msg),
            EngineError::Storage(cause) => ApiError::from(cause),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "SimulationRecord".to_string(),
            id: "abc".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("SimulationRecord"));
                assert!(msg.contains("abc"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseError(_)));
    }

    #[test]
    fn test_storage_failure_message_is_generic() {
        let err = EngineError::Storage(RepositoryError::DatabaseQueryError(
            "disk I/O error at /var/lib/water.db".to_string(),
        ));
        let api_err = ApiError::from_simulation_error(err);
        assert!(matches!(api_err, ApiError::SimulationFailed));
        assert_eq!(api_err.to_string(), "配水模拟失败");

        let err = EngineError::Storage(RepositoryError::LockError("x".to_string()));
        let api_err = ApiError::from_assessment_error(err);
        assert_eq!(api_err.to_string(), "风险评估失败");
    }

    #[test]
    fn test_lookup_failure_message_is_generic() {
        let err = RepositoryError::DatabaseQueryError("no such table: irrigation_district".to_string());
        let api_err = ApiError::from_simulation_storage(err);
        assert!(matches!(api_err, ApiError::SimulationFailed));
        assert!(!api_err.to_string().contains("irrigation_district"));

        let err = RepositoryError::LockError("poisoned".to_string());
        let api_err = ApiError::from_assessment_storage(err);
        assert!(matches!(api_err, ApiError::AssessmentFailed));

        let err = RepositoryError::NotFound {
            entity: "IrrigationDistrict".to_string(),
            id: "9".to_string(),
        };
        assert!(matches!(
            ApiError::from_assessment_storage(err),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_invalid_input_becomes_validation_error() {
        let err = EngineError::InvalidInput("情境名称不能为空".to_string());
        let api_err = ApiError::from_simulation_error(err);
        match api_err {
            ApiError::ValidationError(msg) => assert_eq!(msg, "情境名称不能为空"),
            _ => panic!("Expected ValidationError"),
        }
    }
}
