//! 本地语音模型
//!
//! 不变量: LocalVoiceModel 只在模型的全部必需文件就位且（有校验和时）
//! 通过校验后才能构造；缺失或损坏的文件不会被它引用

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocalModelError {
    #[error("Not an .onnx model file: {}", .0.display())]
    NotAModel(PathBuf),

    #[error("Voice file missing: {}", .0.display())]
    MissingFile(PathBuf),
}

/// 已解析到本地磁盘的语音模型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVoiceModel {
    voice_key: String,
    model_path: PathBuf,
    config_path: PathBuf,
}

impl LocalVoiceModel {
    /// 由资产管理器在全部文件校验通过后构造
    pub(crate) fn new(voice_key: String, model_path: PathBuf, config_path: PathBuf) -> Self {
        Self {
            voice_key,
            model_path,
            config_path,
        }
    }

    /// 从一个已下载的 .onnx 模型路径解析
    ///
    /// 要求模型文件与同名 .onnx.json 配置文件均已存在；
    /// voice key 取模型文件名（去扩展名）
    pub fn from_model_path(model_path: impl Into<PathBuf>) -> Result<Self, LocalModelError> {
        let model_path = model_path.into();

        if model_path.extension().and_then(|e| e.to_str()) != Some("onnx") {
            return Err(LocalModelError::NotAModel(model_path));
        }
        if !model_path.exists() {
            return Err(LocalModelError::MissingFile(model_path));
        }

        let mut config_os = model_path.clone().into_os_string();
        config_os.push(".json");
        let config_path = PathBuf::from(config_os);
        if !config_path.exists() {
            return Err(LocalModelError::MissingFile(config_path));
        }

        let voice_key = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            voice_key,
            model_path,
            config_path,
        })
    }

    pub fn voice_key(&self) -> &str {
        &self.voice_key
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
