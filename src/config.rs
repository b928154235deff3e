//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CLASSWORK__*` 覆盖（双下划线表示嵌套，如 `CLASSWORK__SYNC__AUTO_SAVE_INTERVAL_SECS=30`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub push: PushSection,
    #[serde(default)]
    pub notification: NotificationSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [sync] 段：自动保存
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    /// 自动保存间隔（秒）
    #[serde(default = "default_auto_save_interval_secs")]
    pub auto_save_interval_secs: u64,
}

fn default_auto_save_interval_secs() -> u64 {
    60
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            auto_save_interval_secs: default_auto_save_interval_secs(),
        }
    }
}

/// [push] 段：进程内推送通道
#[derive(Debug, Clone, Deserialize)]
pub struct PushSection {
    /// broadcast 通道容量
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for PushSection {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// [notification] 段：讨论区回复通知文案
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSection {
    /// 回复通知模板，`{usernames}` 会被替换为回复者的显示名
    #[serde(default = "default_reply_message")]
    pub reply_message: String,
}

fn default_reply_message() -> String {
    "{usernames} replied to a discussion you were in".to_string()
}

impl Default for NotificationSection {
    fn default() -> Self {
        Self {
            reply_message: default_reply_message(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            sync: SyncSection::default(),
            push: PushSection::default(),
            notification: NotificationSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 CLASSWORK__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CLASSWORK__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CLASSWORK")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
