use anyhow::{Context, Error};
use config::Config;
use serde::{Deserialize, Serialize};
use std::env;

/// 构建配置源：默认值、可选配置文件、`SUMI` 前缀的环境变量
pub fn load_config_sources() -> Result<Config, Error> {
    let env = env::var("CONFIG_ENV").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "dev".to_string()
        } else {
            "prod".to_string()
        }
    });
    Ok(Config::builder()
        .set_default("app.debug", true)?
        .set_default("app.charset", "UTF-8")?
        .set_default("app.locale", "en")?
        .add_source(config::File::with_name("./sumi").required(false))
        .add_source(config::File::with_name(&format!("./sumi.{}", env)).required(false))
        .add_source(config::Environment::with_prefix("SUMI").separator("__"))
        .build()?)
}

/// 应用配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ApplicationConfig {
    pub debug: bool,
    pub charset: String,
    pub locale: String,
    /// 前端控制器脚本相对文档根的路径，用于请求路径归一化
    pub front_controller: Option<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            debug: true,
            charset: "UTF-8".to_string(),
            locale: "en".to_string(),
            front_controller: None,
        }
    }
}

impl ApplicationConfig {
    /// 从配置源加载 `[app]` 段
    pub fn load() -> Result<Self, Error> {
        load_config_sources()?
            .get::<ApplicationConfig>("app")
            .context("invalid [app] configuration section")
    }

    /// 加载失败时退回默认配置
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
