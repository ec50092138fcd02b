// ==========================================
// 灌区配水决策支持系统 - 领域类型定义
// ==========================================
// 职责: 风险等级、配水优先级、万吨单位换算
// 序列化格式: 小写 (与驾驶舱前端一致)
// ==========================================

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1 万吨 = 10,000 吨
pub const TONS_PER_WAN: f64 = 10_000.0;

/// 可用水量输入上限 (万吨)；超出后换算与舍入不再是有限值
pub const MAX_AVAILABLE_WATER_WAN_T: f64 = 1.0e12;

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 顺序: Low < Moderate < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,      // 低风险
    Moderate, // 中度风险
    High,     // 高风险
    Critical, // 严重风险
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// 从数据库字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "moderate" => Some(RiskLevel::Moderate),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 配水优先级 (Allocation Priority)
// ==========================================
// 由配水比例推导: normal / restricted / critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPriority {
    Normal,     // 正常供水
    Restricted, // 限制供水
    Critical,   // 紧急缺水
}

impl AllocationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationPriority::Normal => "normal",
            AllocationPriority::Restricted => "restricted",
            AllocationPriority::Critical => "critical",
        }
    }
}

impl fmt::Display for AllocationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 单位换算与舍入
// ==========================================

/// 吨 -> 万吨
pub fn tons_to_wan(tons: f64) -> f64 {
    tons / TONS_PER_WAN
}

/// 万吨 -> 吨
pub fn wan_to_tons(wan: f64) -> f64 {
    wan * TONS_PER_WAN
}

/// 按指定小数位四舍五入
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// 当前 UTC 时间，截断到微秒（与数据库存储精度一致）
pub fn current_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_current_timestamp_precision() {
        use chrono::Timelike;
        assert_eq!(current_timestamp().nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_risk_level_parse() {
        assert_eq!(RiskLevel::parse("critical"), Some(RiskLevel::Critical));
        assert_eq!(RiskLevel::parse(" Moderate "), Some(RiskLevel::Moderate));
        assert_eq!(RiskLevel::parse("red"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&AllocationPriority::Restricted).unwrap();
        assert_eq!(json, "\"restricted\"");
        let level: RiskLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(wan_to_tons(5000.0), 50_000_000.0);
        assert_eq!(tons_to_wan(35_000.0), 3.5);
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(0.6666, 3), 0.667);
    }
}
