// ==========================================
// 灌区配水决策支持系统 - 灌区数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::district::{District, NewDistrict};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_datetime, parse_datetime_column};
use crate::domain::types::current_timestamp;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DISTRICT_COLUMNS: &str = r#"
    id, code, name, management_office, county,
    area_ha, irrigated_area_ha, main_crops, water_sources,
    created_at, updated_at
"#;

// ==========================================
// DistrictRepository - 灌区仓储
// ==========================================
/// 灌区仓储
/// 职责: 管理 irrigation_district 表
pub struct DistrictRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DistrictRepository {
    /// 创建新的 DistrictRepository 实例
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

    /// 按 code 新增或更新灌区，返回落库后的记录
    pub fn upsert(&self, district: &NewDistrict) -> RepositoryResult<District> {
        if district.code.trim().is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "code".to_string(),
                message: "灌区代码不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        let now = format_datetime(&current_timestamp());

        conn.execute(
            r#"
            INSERT INTO irrigation_district (
                code, name, management_office, county,
                area_ha, irrigated_area_ha, main_crops, water_sources,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT(code) DO UPDATE SET
                name = excluded.name,
                management_office = excluded.management_office,
                county = excluded.county,
                area_ha = excluded.area_ha,
                irrigated_area_ha = excluded.irrigated_area_ha,
                main_crops = excluded.main_crops,
                water_sources = excluded.water_sources,
                updated_at = excluded.updated_at
            "#,
            params![
                district.code,
                district.name,
                district.management_office,
                district.county,
                district.area_ha,
                district.irrigated_area_ha,
                district.main_crops,
                district.water_sources,
                now,
            ],
        )?;

        let sql = format!("SELECT {} FROM irrigation_district WHERE code = ?1", DISTRICT_COLUMNS);
        let stored = conn.query_row(&sql, params![district.code], map_district_row)?;
        Ok(stored)
    }

    /// 查询全部灌区（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<District>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM irrigation_district ORDER BY name ASC, id ASC", DISTRICT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let districts = stmt
            .query_map([], map_district_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(districts)
    }

    /// 按ID查询
    ///
    /// # 返回
    /// - Ok(Some(District)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<District>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM irrigation_district WHERE id = ?1", DISTRICT_COLUMNS);
        let district = conn.query_row(&sql, params![id], map_district_row).optional()?;
        Ok(district)
    }

    /// 灌区总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM irrigation_district", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn map_district_row(row: &Row<'_>) -> SqliteResult<District> {
    Ok(District {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        management_office: row.get(3)?,
        county: row.get(4)?,
        area_ha: row.get(5)?,
        irrigated_area_ha: row.get(6)?,
        main_crops: row.get(7)?,
        water_sources: row.get(8)?,
        created_at: parse_datetime_column(9, &row.get::<_, String>(9)?)?,
        updated_at: parse_datetime_column(10, &row.get::<_, String>(10)?)?,
    })
}
