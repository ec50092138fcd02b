// ==========================================
// 灌区配水决策支持系统 - 命令行入口
// ==========================================
// 用法: water-allocation-dss <命令> [参数...]
// 输出: JSON (stdout)；日志写入 stderr
// 身份: 本机管理员
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use water_allocation_dss::api::Actor;
use water_allocation_dss::app::{get_default_db_path, AppState};
use water_allocation_dss::{logging, APP_NAME, VERSION};

const USAGE: &str = "\
用法: water-allocation-dss <命令> [参数...]

命令:
  init                                         建表并写入示例灌区
  districts                                    灌区列表
  assess <district_id>                         计算单个灌区风险
  assess-all                                   重算全部灌区风险
  history <district_id> [limit]                风险评估历史
  simulate <district_id> <scenario> [万吨]     执行配水模拟
  simulations <district_id> [limit]            模拟记录列表
  delete-simulation <simulation_id>            删除模拟记录
  overview                                     驾驶舱总览
  config                                       查看配置
  config-set <key> <value>                     修改配置

环境变量:
  WATER_DSS_DB_PATH   数据库路径
  WATER_DSS_LOG_JSON  设置后输出 JSON 日志
  RUST_LOG            日志级别 (默认 info)";

fn main() -> Result<()> {
    if std::env::var_os("WATER_DSS_LOG_JSON").is_some() {
        logging::init_json();
    } else {
        logging::init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{} v{}\n\n{}", APP_NAME, VERSION, USAGE);
        return Ok(());
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let actor = Actor::local_admin();

    match command.as_str() {
        "init" => {
            let seeded = state.district_api.seed_demo_districts(Some(&actor))?;
            print_json(&serde_json::json!({ "dbPath": state.db_path, "seededDistricts": seeded }))?;
        }
        "districts" => print_json(&state.district_api.list_districts()?)?,
        "assess" => {
            let district_id = parse_arg::<i64>(&args, 1, "district_id")?;
            print_json(&state.risk_api.calculate_risk(Some(&actor), district_id)?)?;
        }
        "assess-all" => {
            let count = state.risk_api.calculate_all(Some(&actor))?;
            print_json(&serde_json::json!({ "assessed": count }))?;
        }
        "history" => {
            let district_id = parse_arg::<i64>(&args, 1, "district_id")?;
            let limit = parse_optional_arg::<i64>(&args, 2, "limit")?;
            print_json(&state.risk_api.list_history(district_id, limit)?)?;
        }
        "simulate" => {
            let district_id = parse_arg::<i64>(&args, 1, "district_id")?;
            let scenario = required_arg(&args, 2, "scenario")?;
            let available = parse_optional_arg::<f64>(&args, 3, "available_wan_t")?;
            let outcome = state.allocation_api.run_simulation(
                Some(&actor),
                district_id,
                scenario,
                available,
                BTreeMap::new(),
            )?;
            print_json(&outcome)?;
        }
        "simulations" => {
            let district_id = parse_arg::<i64>(&args, 1, "district_id")?;
            let limit = parse_optional_arg::<i64>(&args, 2, "limit")?;
            print_json(&state.allocation_api.list_simulations(district_id, limit)?)?;
        }
        "delete-simulation" => {
            let simulation_id = required_arg(&args, 1, "simulation_id")?;
            state.allocation_api.delete_simulation(Some(&actor), simulation_id)?;
            print_json(&serde_json::json!({ "deleted": simulation_id }))?;
        }
        "overview" => print_json(&state.dashboard_api.get_overview()?)?,
        "config" => {
            let snapshot = state
                .config_manager
                .get_config_snapshot()
                .map_err(|e| anyhow!(e.to_string()))?;
            println!("{}", snapshot);
        }
        "config-set" => {
            let key = required_arg(&args, 1, "key")?;
            let value = required_arg(&args, 2, "value")?;
            state
                .config_manager
                .set_config_value(key, value)
                .map_err(|e| anyhow!(e.to_string()))?;
            print_json(&serde_json::json!({ "key": key, "value": value }))?;
        }
        "help" | "-h" | "--help" => println!("{}", USAGE),
        other => bail!("未知命令: {}\n\n{}", other, USAGE),
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn required_arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("缺少参数 <{}>\n\n{}", name, USAGE))
}

fn parse_arg<T>(args: &[String], index: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = required_arg(args, index, name)?;
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("参数 <{}> 格式错误: {}", name, raw))
}

fn parse_optional_arg<T>(args: &[String], index: usize, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if args.get(index).is_none() {
        return Ok(None);
    }
    parse_arg(args, index, name).map(Some)
}
