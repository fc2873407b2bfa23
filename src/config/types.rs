//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 语音目录配置
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// 文件存储配置
    #[serde(default)]
    pub store: StoreConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 语音目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// 目录文档 URL
    #[serde(default = "default_catalog_url")]
    pub url: String,

    /// 缓存刷新间隔（秒），0 表示首次获取后不过期
    #[serde(default = "default_catalog_refresh")]
    pub refresh_secs: u64,

    /// 请求超时时间（秒）
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

fn default_catalog_url() -> String {
    "https://huggingface.co/rhasspy/piper-voices/raw/main/voices.json".to_string()
}

fn default_catalog_refresh() -> u64 {
    3600
}

fn default_catalog_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            refresh_secs: default_catalog_refresh(),
            timeout_secs: default_catalog_timeout(),
        }
    }
}

/// 文件存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// 语音文件存储基址
    #[serde(default = "default_store_base_url")]
    pub base_url: String,

    /// 本地语音文件目录
    #[serde(default = "default_voice_dir")]
    pub voice_dir: PathBuf,

    /// 下载请求的 User-Agent（存储端会拒绝裸客户端）
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// 单个文件的下载超时时间（秒）
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

fn default_store_base_url() -> String {
    "https://huggingface.co/rhasspy/piper-voices/resolve/main".to_string()
}

fn default_voice_dir() -> PathBuf {
    PathBuf::from("voice")
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_store_timeout() -> u64 {
    600
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
            voice_dir: default_voice_dir(),
            user_agent: default_user_agent(),
            timeout_secs: default_store_timeout(),
        }
    }
}

/// 音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// speak 未指定模型时的默认模型路径
    #[serde(default = "default_model_path")]
    pub default_model: PathBuf,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("voice/en_US-lessac-medium.onnx")
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_model: default_model_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
