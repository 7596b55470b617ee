// ==========================================
// 来料检验系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 约定: 检验参数统一使用 inspection/ 前缀，缺失或格式错误时回退缺省值
// ==========================================

use crate::config::inspection_config::InspectionConfig;
use crate::db::open_sqlite_connection;
use crate::engine::sampling::SampleSizeTier;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

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
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置值，缺失返回默认值，格式错误记录告警后返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用缺省值");
                Ok(default)
            }
        }
    }

    /// 读取浮点配置值，NaN 与无穷视为格式错误
    fn get_finite_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        let value = self.get_parsed_or_default(key, default)?;
        if value.is_finite() {
            Ok(value)
        } else {
            warn!(config_key = key, raw_value = %value, "配置值不是有限数值，使用缺省值");
            Ok(default)
        }
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 检验参数 =====

    /// 加载检验参数（缺省值 + config_kv 覆写）
    pub fn load_inspection_config(&self) -> Result<InspectionConfig, Box<dyn Error>> {
        let mut cfg = InspectionConfig::default();

        cfg.default_sample_count = self
            .get_parsed_or_default(config_keys::DEFAULT_SAMPLE_COUNT, cfg.default_sample_count)?
            .max(1);

        let generator = &mut cfg.generator;
        if let Some(text) = self.get_config_value(config_keys::HOLD_TIME_DEFAULT)? {
            if !text.trim().is_empty() {
                generator.hold_time_default = text.trim().to_string();
            }
        }
        generator.initial_tack_default_min = self
            .get_parsed_or_default(config_keys::INITIAL_TACK_DEFAULT_MIN, generator.initial_tack_default_min)?;
        generator.initial_tack_cap =
            self.get_parsed_or_default(config_keys::INITIAL_TACK_CAP, generator.initial_tack_cap)?;
        generator.thickness_base =
            self.get_finite_or_default(config_keys::THICKNESS_BASE, generator.thickness_base)?;
        generator.dimension_base =
            self.get_finite_or_default(config_keys::DIMENSION_BASE, generator.dimension_base)?;
        generator.weight_base =
            self.get_finite_or_default(config_keys::WEIGHT_BASE, generator.weight_base)?;

        cfg.judgment.strict_numeric =
            self.get_parsed_or_default(config_keys::STRICT_NUMERIC, cfg.judgment.strict_numeric)?;

        cfg.sampling.default_sample_size = self.get_parsed_or_default(
            config_keys::SAMPLING_DEFAULT_SIZE,
            cfg.sampling.default_sample_size,
        )?;
        cfg.sampling.max_sample_size = self
            .get_parsed_or_default(config_keys::SAMPLING_MAX_SIZE, cfg.sampling.max_sample_size)?;
        if let Some(raw) = self.get_config_value(config_keys::SAMPLING_TIERS)? {
            match parse_tiers(&raw) {
                Some(tiers) => cfg.sampling.tiers = tiers,
                None => warn!(
                    config_key = config_keys::SAMPLING_TIERS,
                    raw_value = %raw,
                    "抽样分档配置格式错误，使用缺省分档"
                ),
            }
        }

        Ok(cfg)
    }
}

/// 解析抽样分档配置，格式 "15:3,50:5,150:8"
fn parse_tiers(raw: &str) -> Option<Vec<SampleSizeTier>> {
    let mut tiers = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (max, size) = part.split_once(':')?;
        tiers.push(SampleSizeTier {
            max_packages: max.trim().parse().ok()?,
            sample_size: size.trim().parse().ok()?,
        });
    }
    if tiers.is_empty() {
        None
    } else {
        Some(tiers)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 样本数
    pub const DEFAULT_SAMPLE_COUNT: &str = "inspection/default_sample_count";
    pub const SAMPLING_DEFAULT_SIZE: &str = "inspection/sampling_default_size";
    pub const SAMPLING_MAX_SIZE: &str = "inspection/sampling_max_size";
    pub const SAMPLING_TIERS: &str = "inspection/sampling_tiers"; // "15:3,50:5,150:8"

    // 样本生成
    pub const HOLD_TIME_DEFAULT: &str = "inspection/hold_time_default";
    pub const INITIAL_TACK_DEFAULT_MIN: &str = "inspection/initial_tack_default_min";
    pub const INITIAL_TACK_CAP: &str = "inspection/initial_tack_cap";
    pub const THICKNESS_BASE: &str = "inspection/thickness_base";
    pub const DIMENSION_BASE: &str = "inspection/dimension_base";
    pub const WEIGHT_BASE: &str = "inspection/weight_base";

    // 判定
    pub const STRICT_NUMERIC: &str = "inspection/strict_numeric";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::inspection::InspectionItem;
    use crate::engine::sample_generator::{GeneratorConfig, SampleValueGenerator};

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_empty_table_yields_defaults() {
        let mgr = manager();
        assert_eq!(mgr.load_inspection_config().unwrap(), InspectionConfig::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::INITIAL_TACK_CAP, "15").unwrap();
        mgr.set_global_config_value(config_keys::STRICT_NUMERIC, "true").unwrap();
        mgr.set_global_config_value(config_keys::SAMPLING_TIERS, "10:2, 100:6").unwrap();
        mgr.set_global_config_value(config_keys::HOLD_TIME_DEFAULT, "≥ 48h").unwrap();

        let cfg = mgr.load_inspection_config().unwrap();
        assert_eq!(cfg.generator.initial_tack_cap, 15);
        assert_eq!(cfg.generator.hold_time_default, "≥ 48h");
        assert!(cfg.judgment.strict_numeric);
        assert_eq!(cfg.sampling.tiers.len(), 2);
        assert_eq!(cfg.sampling.sample_size_for_packages(80), 6);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::THICKNESS_BASE, "abc").unwrap();
        mgr.set_global_config_value(config_keys::SAMPLING_TIERS, "15-3").unwrap();
        mgr.set_global_config_value(config_keys::DEFAULT_SAMPLE_COUNT, "0").unwrap();

        let cfg = mgr.load_inspection_config().unwrap();
        assert_eq!(cfg.generator.thickness_base, 0.05);
        assert_eq!(cfg.sampling, InspectionConfig::default().sampling);
        assert_eq!(cfg.default_sample_count, 1);
    }

    #[test]
    fn test_non_finite_bases_fall_back() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::THICKNESS_BASE, "NaN").unwrap();
        mgr.set_global_config_value(config_keys::DIMENSION_BASE, "inf").unwrap();
        mgr.set_global_config_value(config_keys::WEIGHT_BASE, "-infinity").unwrap();

        let cfg = mgr.load_inspection_config().unwrap();
        assert_eq!(cfg.generator, GeneratorConfig::default());

        let generator = SampleValueGenerator::new(cfg.generator);
        let item = InspectionItem::new(1, "厚度").with_criteria("均匀");
        for value in generator.generate(&item, 3) {
            let v: f64 = value.parse().unwrap();
            assert!((0.045 - 1e-9..=0.055 + 1e-9).contains(&v), "厚度 {}", value);
        }
    }

    #[test]
    fn test_set_overwrites_and_snapshot() {
        let mgr = manager();
        mgr.set_global_config_value("inspection/weight_base", "8").unwrap();
        mgr.set_global_config_value("inspection/weight_base", "9").unwrap();
        assert_eq!(
            mgr.get_global_config_value("inspection/weight_base").unwrap().as_deref(),
            Some("9")
        );
        let snapshot: HashMap<String, String> =
            serde_json::from_str(&mgr.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.len(), 1);
    }
}
