// ==========================================
// 灌区配水决策支持系统 - 调用者鉴权
// ==========================================
// 职责: 校验调用者身份与角色
// 说明: 会话管理不在本库范围内，调用方传入已认证的 Actor
// ==========================================

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};

/// 调用者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    User,
    Admin,
}

/// 已认证的调用者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: i64,
    pub role: ActorRole,
}

impl Actor {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            role: ActorRole::User,
        }
    }

    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            role: ActorRole::Admin,
        }
    }

    /// 本机命令行使用的管理员身份
    pub fn local_admin() -> Self {
        Self::admin(0)
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}

/// 要求已登录
pub fn require_authenticated(actor: Option<&Actor>) -> ApiResult<&Actor> {
    actor.ok_or_else(|| ApiError::Unauthorized("请先登录".to_string()))
}

/// 要求管理员角色
pub fn require_admin(actor: Option<&Actor>) -> ApiResult<&Actor> {
    let actor = require_authenticated(actor)?;
    if !actor.is_admin() {
        tracing::warn!(user_id = actor.user_id, "非管理员尝试执行管理操作");
        return Err(ApiError::PermissionDenied("需要管理员权限".to_string()));
    }
    Ok(actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_authenticated() {
        assert!(matches!(
            require_authenticated(None),
            Err(ApiError::Unauthorized(_))
        ));
        let actor = Actor::user(7);
        assert_eq!(require_authenticated(Some(&actor)).unwrap().user_id, 7);
    }

    #[test]
    fn test_require_admin() {
        let user = Actor::user(7);
        assert!(matches!(
            require_admin(Some(&user)),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(require_admin(None), Err(ApiError::Unauthorized(_))));

        let admin = Actor::local_admin();
        assert!(require_admin(Some(&admin)).is_ok());
    }
}
