// ==========================================
// 灌区配水决策支持系统 - 缺水风险评估数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 评估记录只追加，不更新
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::risk::{LatestRiskAssessment, RiskAssessment};
use crate::domain::types::RiskLevel;
use crate::engine::store::RiskAssessmentStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_datetime, parse_datetime_column, parse_json_column};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const ASSESSMENT_COLUMNS: &str = r#"
    assessment_id, district_id, assessment_date,
    risk_level, risk_score,
    water_supply, water_demand, supply_demand_ratio,
    rainfall_forecast, reservoir_storage,
    factors, recommendations
"#;

// ==========================================
// RiskAssessmentRepository - 风险评估仓储
// ==========================================
/// 风险评估仓储
/// 职责: 管理 risk_assessment 表
/// 用途: 驾驶舱风险分布、灌区风险历史
pub struct RiskAssessmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RiskAssessmentRepository {
    /// 创建新的 RiskAssessmentRepository 实例
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

    /// 插入一条评估记录
    ///
    /// # 返回
    /// - Err(ForeignKeyViolation): 灌区不存在
    pub fn insert(&self, assessment: &RiskAssessment) -> RepositoryResult<()> {
        let factors_json = serde_json::to_string(&assessment.factors)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO risk_assessment (
                assessment_id, district_id, assessment_date,
                risk_level, risk_score,
                water_supply, water_demand, supply_demand_ratio,
                rainfall_forecast, reservoir_storage,
                factors, recommendations
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                assessment.assessment_id,
                assessment.district_id,
                format_datetime(&assessment.assessment_date),
                assessment.risk_level.as_str(),
                assessment.risk_score,
                assessment.water_supply,
                assessment.water_demand,
                assessment.supply_demand_ratio,
                assessment.rainfall_forecast,
                assessment.reservoir_storage,
                factors_json,
                assessment.recommendations,
            ],
        )?;

        Ok(())
    }

    /// 查询灌区评估历史（最新在前）
    pub fn find_by_district(&self, district_id: i64, limit: usize) -> RepositoryResult<Vec<RiskAssessment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM risk_assessment
            WHERE district_id = ?1
            ORDER BY assessment_date DESC, rowid DESC
            LIMIT ?2
            "#,
            ASSESSMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let assessments = stmt
            .query_map(params![district_id, limit as i64], |row| map_assessment_row(row, 0))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(assessments)
    }

    /// 每个灌区最新一次评估（按灌区名称排序）
    pub fn find_latest_per_district(&self) -> RepositoryResult<Vec<LatestRiskAssessment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT d.id, d.name, d.county, {}
            FROM (
                SELECT ra.*,
                       ROW_NUMBER() OVER (
                           PARTITION BY ra.district_id
                           ORDER BY ra.assessment_date DESC, ra.rowid DESC
                       ) AS rn
                FROM risk_assessment ra
            ) latest
            JOIN irrigation_district d ON d.id = latest.district_id
            WHERE latest.rn = 1
            ORDER BY d.name ASC, d.id ASC
            "#,
            ASSESSMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LatestRiskAssessment {
                    district_id: row.get(0)?,
                    district_name: row.get(1)?,
                    county: row.get(2)?,
                    assessment: map_assessment_row(row, 3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 灌区评估记录数
    pub fn count_by_district(&self, district_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM risk_assessment WHERE district_id = ?1",
            params![district_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

impl RiskAssessmentStore for RiskAssessmentRepository {
    fn insert_risk_assessment(&self, assessment: &RiskAssessment) -> RepositoryResult<()> {
        self.insert(assessment)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 从 `offset` 列开始映射评估记录
fn map_assessment_row(row: &Row<'_>, offset: usize) -> SqliteResult<RiskAssessment> {
    let level_raw: String = row.get(offset + 3)?;
    let risk_level = RiskLevel::parse(&level_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            offset + 3,
            rusqlite::types::Type::Text,
            format!("未知风险等级: {}", level_raw).into(),
        )
    })?;

    Ok(RiskAssessment {
        assessment_id: row.get(offset)?,
        district_id: row.get(offset + 1)?,
        assessment_date: parse_datetime_column(offset + 2, &row.get::<_, String>(offset + 2)?)?,
        risk_level,
        risk_score: row.get(offset + 4)?,
        water_supply: row.get(offset + 5)?,
        water_demand: row.get(offset + 6)?,
        supply_demand_ratio: row.get(offset + 7)?,
        rainfall_forecast: row.get(offset + 8)?,
        reservoir_storage: row.get(offset + 9)?,
        factors: parse_json_column(offset + 10, &row.get::<_, String>(offset + 10)?)?,
        recommendations: row.get(offset + 11)?,
    })
}
