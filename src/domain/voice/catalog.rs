//! Voice Catalog - 语音目录数据模型
//!
//! 远端 voices.json 文档的强类型表示。整个文档在获取时一次性解析并校验，
//! 非法条目立即以类型化错误拒绝，而不是等到字段访问时才失败。
//! 目录保持文档顺序——最佳匹配的语义建立在目录序之上。

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// 目录解析错误
#[derive(Debug, Error)]
pub enum CatalogParseError {
    #[error("Invalid catalog document: {0}")]
    Document(String),

    #[error("Invalid catalog entry '{key}': {reason}")]
    Entry { key: String, reason: String },
}

/// 音质等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    XLow,
    Low,
    Medium,
    High,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XLow => "x_low",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x_low" => Ok(Self::XLow),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown quality '{}', expected one of: x_low, low, medium, high",
                other
            )),
        }
    }
}

/// 语言信息
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceLanguage {
    /// 语言代码，如 "en_US"
    pub code: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub name_native: String,
    #[serde(default)]
    pub name_english: String,
    #[serde(default)]
    pub country_english: String,
}

/// 语音文件条目
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceFile {
    pub size_bytes: u64,
    /// 无校验和的文件按下载即有效处理
    #[serde(default)]
    pub md5_digest: Option<String>,
}

/// 语音描述符
///
/// 目录中的一个条目；获取后不可变
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceDescriptor {
    /// 目录 key，解析时注入
    #[serde(skip)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub language: VoiceLanguage,
    pub quality: QualityTier,
    pub num_speakers: u32,
    /// 多说话人模型的命名说话人 → id 映射
    #[serde(default)]
    pub speaker_id_map: HashMap<String, u32>,
    /// 相对路径 → 文件信息；BTreeMap 保证下载顺序稳定
    pub files: BTreeMap<String, VoiceFile>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl VoiceDescriptor {
    /// 主模型文件（第一个 .onnx 条目）
    pub fn model_file(&self) -> Option<(&str, &VoiceFile)> {
        self.files
            .iter()
            .find(|(path, _)| path.ends_with(".onnx"))
            .map(|(path, file)| (path.as_str(), file))
    }

    /// 配套模型配置文件
    pub fn config_file(&self) -> Option<(&str, &VoiceFile)> {
        self.files
            .iter()
            .find(|(path, _)| path.ends_with(".onnx.json"))
            .map(|(path, file)| (path.as_str(), file))
    }

    /// 主模型文件大小 (MB)，用于展示
    pub fn model_size_mb(&self) -> f64 {
        self.model_file()
            .map(|(_, file)| file.size_bytes as f64 / (1024.0 * 1024.0))
            .unwrap_or(0.0)
    }
}

/// 语音目录
///
/// key → 描述符的有序映射；查找支持别名回退
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<VoiceDescriptor>,
    index: HashMap<String, usize>,
}

impl VoiceCatalog {
    /// 解析完整目录文档
    ///
    /// 任一条目非法即整体失败，并指出出错的 key
    pub fn parse(document: &str) -> Result<Self, CatalogParseError> {
        let root: serde_json::Map<String, serde_json::Value> = serde_json::from_str(document)
            .map_err(|e| CatalogParseError::Document(e.to_string()))?;

        let mut voices = Vec::with_capacity(root.len());
        let mut index = HashMap::new();

        for (key, value) in root {
            let mut descriptor: VoiceDescriptor =
                serde_json::from_value(value).map_err(|e| CatalogParseError::Entry {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            descriptor.key = key.clone();

            for alias in &descriptor.aliases {
                index.entry(alias.clone()).or_insert(voices.len());
            }
            index.insert(key, voices.len());
            voices.push(descriptor);
        }

        Ok(Self { voices, index })
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// 按 key 查找，key 不存在时尝试别名
    pub fn get(&self, key: &str) -> Option<&VoiceDescriptor> {
        self.index.get(key).map(|&i| &self.voices[i])
    }

    /// 目录序遍历
    pub fn iter(&self) -> impl Iterator<Item = &VoiceDescriptor> {
        self.voices.iter()
    }

    /// 按语言代码前缀与音质过滤，保持目录顺序（纯查询）
    pub fn filter(
        &self,
        language: Option<&str>,
        quality: Option<QualityTier>,
    ) -> Vec<&VoiceDescriptor> {
        self.voices
            .iter()
            .filter(|v| language.map_or(true, |l| v.language.code.starts_with(l)))
            .filter(|v| quality.map_or(true, |q| v.quality == q))
            .collect()
    }

    /// 为语言选择最佳语音
    ///
    /// 在语言代码与 `language_code` 共享 2 字母前缀的条目中，返回目录序
    /// 第一个音质完全匹配的；若无，退回该语言任意音质的第一个条目；
    /// 语言完全无匹配时返回 None
    pub fn find_best_voice(
        &self,
        language_code: &str,
        quality: QualityTier,
    ) -> Option<&VoiceDescriptor> {
        let prefix: String = language_code.chars().take(2).collect();
        let mut language_match = None;

        for voice in &self.voices {
            if !voice.language.code.starts_with(&prefix) {
                continue;
            }
            if voice.quality == quality {
                return Some(voice);
            }
            if language_match.is_none() {
                language_match = Some(voice);
            }
        }

        language_match
    }
}

/// 常用语言名称 → 语言代码
const LANGUAGE_NAME_MAP: &[(&str, &str)] = &[
    ("english", "en_US"),
    ("spanish", "es_ES"),
    ("french", "fr_FR"),
    ("german", "de_DE"),
    ("italian", "it_IT"),
    ("portuguese", "pt_BR"),
    ("russian", "ru_RU"),
    ("chinese", "zh_CN"),
    ("japanese", "ja_JP"),
    ("korean", "ko_KR"),
    ("arabic", "ar_JO"),
    ("hindi", "hi_IN"),
];

/// 将语言名称或代码归一化为语言代码
///
/// 名称匹配大小写不敏感；未识别的输入原样返回（视为已是代码）
pub fn normalize_language(language: &str) -> String {
    let lower = language.to_lowercase();
    LANGUAGE_NAME_MAP
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| language.to_string())
}
