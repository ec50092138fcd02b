// ==========================================
// 灌区配水决策支持系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 风险历史默认返回条数
pub const DEFAULT_RISK_HISTORY_LIMIT: usize = 30;
/// 模拟记录默认返回条数
pub const DEFAULT_SIMULATION_LIST_LIMIT: usize = 10;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let key = key.trim();
        if key.is_empty() {
            return Err("配置键不能为空".into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 查询上限 =====

    /// 风险历史默认条数（默认 30）
    pub fn get_risk_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_usize(config_keys::RISK_HISTORY_LIMIT, DEFAULT_RISK_HISTORY_LIMIT)
    }

    /// 模拟记录默认条数（默认 10）
    pub fn get_simulation_list_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_usize(
            config_keys::SIMULATION_LIST_LIMIT,
            DEFAULT_SIMULATION_LIST_LIMIT,
        )
    }

    // ===== 采样 =====

    /// 采样器种子；未配置时返回 None（使用系统熵）
    pub fn get_sampler_seed(&self) -> Result<Option<u64>, Box<dyn Error>> {
        let value = match self.get_global_config_value(config_keys::SAMPLER_SEED)? {
            Some(v) => v,
            None => return Ok(None),
        };

        match value.trim().parse::<u64>() {
            Ok(seed) => Ok(Some(seed)),
            Err(_) => {
                tracing::warn!(
                    config_key = config_keys::SAMPLER_SEED,
                    raw_value = %value,
                    "采样种子配置格式错误，使用系统熵"
                );
                Ok(None)
            }
        }
    }

    fn get_positive_usize(&self, key: &str, default: usize) -> Result<usize, Box<dyn Error>> {
        let value = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "配置值无效，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 查询上限
    pub const RISK_HISTORY_LIMIT: &str = "risk_history_limit";
    pub const SIMULATION_LIST_LIMIT: &str = "simulation_list_limit";

    // 采样
    pub const SAMPLER_SEED: &str = "sampler_seed";
}
