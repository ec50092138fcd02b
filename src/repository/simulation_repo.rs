// ==========================================
// 灌区配水决策支持系统 - 配水模拟记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 记录只追加；删除为物理删除，无软删除
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::allocation::{SimulationRecord, SimulationStatus};
use crate::engine::store::SimulationStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_datetime, parse_datetime_column, parse_json_column};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SIMULATION_COLUMNS: &str = r#"
    simulation_id, district_id, scenario_name, simulation_date,
    simulation_params, total_water_available, total_water_demand,
    allocation_efficiency, allocation_plan, results, status, created_by
"#;

// ==========================================
// SimulationRepository - 配水模拟仓储
// ==========================================
/// 配水模拟仓储
/// 职责: 管理 water_allocation_simulation 表
pub struct SimulationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SimulationRepository {
    /// 创建新的 SimulationRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入一条模拟记录
    pub fn insert(&self, record: &SimulationRecord) -> RepositoryResult<()> {
        let params_json = serde_json::to_string(&record.parameters)?;
        let plan_json = serde_json::to_string(&record.allocation_plan)?;
        let results_json = serde_json::to_string(&record.results)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO water_allocation_simulation (
                simulation_id, district_id, scenario_name, simulation_date,
                simulation_params, total_water_available, total_water_demand,
                allocation_efficiency, allocation_plan, results, status, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.simulation_id,
                record.district_id,
                record.scenario_name,
                format_datetime(&record.simulation_date),
                params_json,
                record.total_water_available,
                record.total_water_demand,
                record.allocation_efficiency,
                plan_json,
                results_json,
                record.status.as_str(),
                record.created_by,
            ],
        )?;

        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, simulation_id: &str) -> RepositoryResult<Option<SimulationRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM water_allocation_simulation WHERE simulation_id = ?1",
            SIMULATION_COLUMNS
        );
        let record = conn
            .query_row(&sql, params![simulation_id], map_simulation_row)
            .optional()?;
        Ok(record)
    }

    /// 查询灌区模拟记录（最新在前）
    pub fn find_by_district(&self, district_id: i64, limit: usize) -> RepositoryResult<Vec<SimulationRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM water_allocation_simulation
            WHERE district_id = ?1
            ORDER BY simulation_date DESC, rowid DESC
            LIMIT ?2
            "#,
            SIMULATION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map(params![district_id, limit as i64], map_simulation_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    /// 按ID删除
    ///
    /// # 返回
    /// - Ok(()): 删除了恰好一条记录
    /// - Err(NotFound): 记录不存在
    pub fn delete(&self, simulation_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let count = conn.execute(
            "DELETE FROM water_allocation_simulation WHERE simulation_id = ?1",
            params![simulation_id],
        )?;

        if count == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SimulationRecord".to_string(),
                id: simulation_id.to_string(),
            });
        }
        Ok(())
    }

    /// 灌区模拟记录数
    pub fn count_by_district(&self, district_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM water_allocation_simulation WHERE district_id = ?1",
            params![district_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

impl SimulationStore for SimulationRepository {
    fn insert_simulation_record(&self, record: &SimulationRecord) -> RepositoryResult<()> {
        self.insert(record)
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn map_simulation_row(row: &Row<'_>) -> SqliteResult<SimulationRecord> {
    let status_raw: String = row.get(10)?;
    let status = parse_status(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            rusqlite::types::Type::Text,
            format!("未知模拟状态: {}", status_raw).into(),
        )
    })?;

    Ok(SimulationRecord {
        simulation_id: row.get(0)?,
        district_id: row.get(1)?,
        scenario_name: row.get(2)?,
        simulation_date: parse_datetime_column(3, &row.get::<_, String>(3)?)?,
        parameters: parse_json_column(4, &row.get::<_, String>(4)?)?,
        total_water_available: row.get(5)?,
        total_water_demand: row.get(6)?,
        allocation_efficiency: row.get(7)?,
        allocation_plan: parse_json_column(8, &row.get::<_, String>(8)?)?,
        results: parse_json_column(9, &row.get::<_, String>(9)?)?,
        status,
        created_by: row.get(11)?,
    })
}

fn parse_status(s: &str) -> Option<SimulationStatus> {
    match s {
        "completed" => Some(SimulationStatus::Completed),
        _ => None,
    }
}
