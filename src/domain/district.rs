// ==========================================
// 灌区配水决策支持系统 - 灌区领域模型
// ==========================================
// 用途: 风险评估与配水模拟的核算单位
// 计算引擎只读取 district_id，不修改灌区本身
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 灌区 (农田水利管理处 / 工作站)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: i64,                            // 灌区ID
    pub code: String,                       // 灌区代码 (唯一)
    pub name: String,                       // 名称
    pub management_office: Option<String>,  // 管理处
    pub county: Option<String>,             // 县市
    pub area_ha: Option<f64>,               // 面积
    pub irrigated_area_ha: Option<f64>,     // 灌溉面积
    pub main_crops: Option<String>,         // 主要作物
    pub water_sources: Option<String>,      // 水源
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 新增/更新灌区的输入 (按 code upsert)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDistrict {
    pub code: String,
    pub name: String,
    pub management_office: Option<String>,
    pub county: Option<String>,
    pub area_ha: Option<f64>,
    pub irrigated_area_ha: Option<f64>,
    pub main_crops: Option<String>,
    pub water_sources: Option<String>,
}

impl NewDistrict {
    /// 仅含必填字段的简易构造
    pub fn new(code: &str, name: &str, county: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            management_office: None,
            county: county.map(|c| c.to_string()),
            area_ha: None,
            irrigated_area_ha: None,
            main_crops: None,
            water_sources: None,
        }
    }
}

/// 农田水利署各管理处演示数据
pub fn demo_districts() -> Vec<NewDistrict> {
    let rows: [(&str, &str, &str, &str, f64, f64, &str, &str); 15] = [
        ("ID001", "桃園管理處", "農田水利署桃園管理處", "桃園市", 25000.0, 18000.0, "水稻、蔬菜、茶葉", "石門水庫、埤塘"),
        ("ID002", "石門管理處", "農田水利署石門管理處", "桃園市", 32000.0, 24000.0, "水稻、茶葉、柑橘", "石門水庫、大漢溪"),
        ("ID003", "新竹管理處", "農田水利署新竹管理處", "新竹縣", 18000.0, 12000.0, "水稻、柑橘、水梨", "寶山水庫、頭前溪"),
        ("ID004", "苗栗管理處", "農田水利署苗栗管理處", "苗栗縣", 22000.0, 15000.0, "水稻、草莓、芥菜", "鯉魚潭水庫、後龍溪"),
        ("ID005", "台中管理處", "農田水利署台中管理處", "台中市", 45000.0, 35000.0, "水稻、蔬菜、花卉、葡萄", "德基水庫、大甲溪"),
        ("ID006", "南投管理處", "農田水利署南投管理處", "南投縣", 28000.0, 20000.0, "水稻、茶葉、竹筍", "日月潭水庫、濁水溪"),
        ("ID007", "彰化管理處", "農田水利署彰化管理處", "彰化縣", 55000.0, 42000.0, "水稻、葡萄、花椰菜", "集集攔河堰、濁水溪"),
        ("ID008", "雲林管理處", "農田水利署雲林管理處", "雲林縣", 48000.0, 38000.0, "水稻、花生、大蒜", "湖山水庫、北港溪"),
        ("ID009", "嘉南管理處", "農田水利署嘉南管理處", "台南市", 78000.0, 65000.0, "水稻、甘蔗、蓮藕、玉米", "曾文水庫、烏山頭水庫、嘉南大圳"),
        ("ID010", "高雄管理處", "農田水利署高雄管理處", "高雄市", 35000.0, 28000.0, "水稻、蔬菜、芒果、香蕉", "阿公店水庫、高屏溪"),
        ("ID011", "屏東管理處", "農田水利署屏東管理處", "屏東縣", 42000.0, 32000.0, "水稻、蓮霧、香蕉、檸檬", "牡丹水庫、高屏溪"),
        ("ID012", "台東管理處", "農田水利署台東管理處", "台東縣", 25000.0, 18000.0, "水稻、釋迦、鳳梨", "卑南溪、地下水"),
        ("ID013", "花蓮管理處", "農田水利署花蓮管理處", "花蓮縣", 30000.0, 22000.0, "水稻、西瓜、文旦", "花蓮溪、秀姑巒溪"),
        ("ID014", "宜蘭管理處", "農田水利署宜蘭管理處", "宜蘭縣", 22000.0, 16000.0, "水稻、三星蔥、金棗", "蘭陽溪、宜蘭河"),
        ("ID015", "湖口工作站", "農田水利署桃園管理處湖口工作站", "新竹縣", 8500.0, 6200.0, "水稻、蔬菜、茶葉", "石門水庫、埤塘"),
    ];

    rows.iter()
        .map(|(code, name, office, county, area, irrigated, crops, sources)| NewDistrict {
            code: code.to_string(),
            name: name.to_string(),
            management_office: Some(office.to_string()),
            county: Some(county.to_string()),
            area_ha: Some(*area),
            irrigated_area_ha: Some(*irrigated),
            main_crops: Some(crops.to_string()),
            water_sources: Some(sources.to_string()),
        })
        .collect()
}
