//! Voice Tools - 面向智能体的工具门面
//!
//! 每个操作都返回人类可读的状态字符串；下层的任何失败都在此折叠为
//! 描述性文本，绝不向调用方抛出。阻塞的音频流水线在 blocking 任务上
//! 执行，不占用异步运行时线程。

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::assets::{AssetError, VoiceAssetManager};
use crate::application::catalog::VoiceCatalogClient;
use crate::application::ports::CatalogError;
use crate::application::speaker::{InterruptFlag, Speaker};
use crate::domain::voice::{normalize_language, LocalVoiceModel, QualityTier, VoiceDescriptor};

/// 工具门面配置
#[derive(Debug, Clone)]
pub struct VoiceToolsConfig {
    /// 语音文件目录
    pub voice_dir: PathBuf,
    /// speak 未指定模型时的默认模型路径
    pub default_model: PathBuf,
}

impl Default for VoiceToolsConfig {
    fn default() -> Self {
        Self {
            voice_dir: PathBuf::from("voice"),
            default_model: PathBuf::from("voice/en_US-lessac-medium.onnx"),
        }
    }
}

/// 语音工具门面
pub struct VoiceTools {
    catalog: Arc<VoiceCatalogClient>,
    assets: Arc<VoiceAssetManager>,
    speaker: Arc<Speaker>,
    config: VoiceToolsConfig,
}

impl VoiceTools {
    pub fn new(
        catalog: Arc<VoiceCatalogClient>,
        assets: Arc<VoiceAssetManager>,
        speaker: Arc<Speaker>,
        config: VoiceToolsConfig,
    ) -> Self {
        Self {
            catalog,
            assets,
            speaker,
            config,
        }
    }

    /// 合成并实时播放文本，阻塞到播放结束、被中断或失败
    pub async fn speak(
        &self,
        text: &str,
        model_path: Option<PathBuf>,
        interrupt: InterruptFlag,
    ) -> String {
        let model_path = model_path.unwrap_or_else(|| self.config.default_model.clone());
        let model = match LocalVoiceModel::from_model_path(&model_path) {
            Ok(model) => model,
            Err(e) => return format!("Error speaking text: {}", e),
        };

        let speaker = self.speaker.clone();
        let text = text.to_string();
        let joined =
            tokio::task::spawn_blocking(move || speaker.speak(&text, &model, &interrupt)).await;

        match joined {
            Ok(outcome) => outcome.message(),
            Err(e) => format!("Error speaking text: playback task failed: {}", e),
        }
    }

    /// 列出目录中的可用语音，支持语言前缀与音质过滤
    pub async fn list_voices(&self, language: Option<&str>, quality: Option<QualityTier>) -> String {
        let voices = match self.catalog.list_voices(language, quality).await {
            Ok(voices) => voices,
            Err(e) => return format!("Error fetching voice list: {}", e),
        };

        if voices.is_empty() {
            return format!(
                "No voices found matching filters (language='{}', quality='{}')",
                language.unwrap_or(""),
                quality.map(|q| q.as_str()).unwrap_or("")
            );
        }

        let mut lines = Vec::with_capacity(voices.len() + 3);
        lines.push(format!(
            "{:<30} {:<15} {:<10} {:<10} {:<12}",
            "Key", "Language", "Quality", "Speakers", "Size (MB)"
        ));
        lines.push("-".repeat(85));
        for voice in &voices {
            let speakers = format!(
                "{} speaker{}",
                voice.num_speakers,
                if voice.num_speakers > 1 { "s" } else { "" }
            );
            lines.push(format!(
                "{:<30} {:<15} {:<10} {:<10} {:>9.1} MB",
                voice.key,
                voice.language.code,
                voice.quality.as_str(),
                speakers,
                voice.model_size_mb()
            ));
        }
        lines.push(format!("\nTotal: {} voice(s) found", voices.len()));
        lines.join("\n")
    }

    /// 单个语音的详细信息
    pub async fn voice_info(&self, voice_key: &str) -> String {
        let voice = match self.catalog.descriptor(voice_key).await {
            Ok(voice) => voice,
            Err(CatalogError::VoiceNotFound(key)) => {
                return format!(
                    "Error: Voice '{}' not found. Use the list command to see available voices.",
                    key
                )
            }
            Err(e) => return format!("Error fetching voice info: {}", e),
        };

        let mut lines = vec![
            format!("Voice: {}", voice.key),
            format!("Name: {}", voice.name),
            String::new(),
            "Language:".to_string(),
            format!("  Code: {}", voice.language.code),
            format!("  Family: {}", voice.language.family),
            format!("  Region: {}", voice.language.region),
            format!("  Native: {}", voice.language.name_native),
            format!("  English: {}", voice.language.name_english),
            format!("  Country: {}", voice.language.country_english),
            String::new(),
            format!("Quality: {}", voice.quality),
            format!("Number of Speakers: {}", voice.num_speakers),
        ];

        if !voice.speaker_id_map.is_empty() {
            lines.push(String::new());
            lines.push("Available Speakers:".to_string());
            let mut speakers: Vec<_> = voice.speaker_id_map.iter().collect();
            speakers.sort_by_key(|(_, id)| **id);
            for (name, id) in speakers {
                lines.push(format!("  {}: {}", id, name));
            }
        }

        lines.push(String::new());
        lines.push("Files:".to_string());
        for (path, file) in &voice.files {
            let name = path.rsplit('/').next().unwrap_or(path);
            lines.push(format!(
                "  {}: {:.1} MB",
                name,
                file.size_bytes as f64 / (1024.0 * 1024.0)
            ));
        }

        if !voice.aliases.is_empty() {
            lines.push(String::new());
            lines.push(format!("Aliases: {}", voice.aliases.join(", ")));
        }

        lines.join("\n")
    }

    /// 为语言名称或代码查找最佳语音
    pub async fn find_voice_for_language(&self, language: &str, quality: QualityTier) -> String {
        let code = normalize_language(language);

        let key = match self.catalog.find_best_voice(&code, quality).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                return format!(
                    "No voice found for language '{}'. Use the list command to see available languages.",
                    language
                )
            }
            Err(e) => return format!("Error finding voice: {}", e),
        };

        match self.catalog.descriptor(&key).await {
            Ok(voice) => format!(
                "Best match for '{}':\n\
                 Voice Key: {}\n\
                 Language: {} ({})\n\
                 Quality: {}\n\
                 Size: {:.1} MB\n\
                 \n\
                 To download: download {}",
                language,
                voice.key,
                voice.language.name_english,
                voice.language.code,
                voice.quality,
                voice.model_size_mb(),
                voice.key
            ),
            Err(e) => format!("Error finding voice: {}", e),
        }
    }

    /// 下载并校验一个语音模型
    pub async fn download_voice(&self, voice_key: &str, output_dir: Option<PathBuf>) -> String {
        let dir = output_dir.unwrap_or_else(|| self.config.voice_dir.clone());

        match self.assets.ensure_local(voice_key, &dir).await {
            Ok(model) => format!(
                "Voice '{}' downloaded and verified.\n\
                 Model path: {}\n\
                 \n\
                 Usage:\n\
                   speak --model {} \"Hello world\"",
                voice_key,
                model.model_path().display(),
                model.model_path().display()
            ),
            Err(AssetError::Catalog(CatalogError::VoiceNotFound(key))) => {
                let sample = self.sample_keys(10).await;
                format!(
                    "Error: Voice '{}' not found.\n\
                     Use the list command to see all available voices.\n\
                     First {} available: {}...",
                    key,
                    sample.len(),
                    sample.join(", ")
                )
            }
            Err(e) => format!("Error downloading voice: {}", e),
        }
    }

    /// 一步完成查找 + 下载
    pub async fn auto_setup_voice(&self, language: &str, quality: QualityTier) -> String {
        let code = normalize_language(language);

        let key = match self.catalog.find_best_voice(&code, quality).await {
            Ok(Some(key)) => key,
            Ok(None) => return format!("No voice available for language '{}'.", language),
            Err(e) => return format!("Error setting up voice: {}", e),
        };

        // 主模型文件已在本地时直接复用
        let model_file = self.config.voice_dir.join(format!("{}.onnx", key));
        if model_file.exists() {
            return format!(
                "Voice already available: {}\nModel path: {}",
                key,
                model_file.display()
            );
        }

        match self.assets.ensure_local(&key, &self.config.voice_dir).await {
            Ok(model) => format!(
                "Voice '{}' ready for use\nModel path: {}",
                key,
                model.model_path().display()
            ),
            Err(e) => format!("Error setting up voice: {}", e),
        }
    }

    /// 列出本地已下载的语音模型
    pub async fn downloaded_voices(&self) -> String {
        let dir = &self.config.voice_dir;
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(_) => {
                return "No voices downloaded yet. Use the setup command to download a voice."
                    .to_string()
            }
        };

        let mut voices = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
                continue;
            }
            let size_mb = entry
                .metadata()
                .await
                .map(|m| m.len() as f64 / (1024.0 * 1024.0))
                .unwrap_or(0.0);
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            voices.push((key, size_mb, path));
        }

        if voices.is_empty() {
            return format!(
                "No voices found in {}/. Use the setup command to download a voice.",
                dir.display()
            );
        }
        voices.sort_by(|a, b| a.0.cmp(&b.0));

        let mut lines = vec!["Downloaded voices:".to_string()];
        for (key, size_mb, path) in &voices {
            lines.push(format!(
                "  {} ({:.1} MB) - Path: {}",
                key,
                size_mb,
                path.display()
            ));
        }
        lines.push(format!(
            "\nTotal: {} voice(s) available locally",
            voices.len()
        ));
        lines.join("\n")
    }

    /// 目录前 N 个 key（排序后），用于未找到语音时的提示
    async fn sample_keys(&self, n: usize) -> Vec<String> {
        match self.catalog.list_voices(None, None).await {
            Ok(voices) => {
                let mut keys: Vec<String> =
                    voices.iter().map(|v: &VoiceDescriptor| v.key.clone()).collect();
                keys.sort();
                keys.truncate(n);
                keys
            }
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::catalog::CatalogClientConfig;
    use crate::domain::audio::AudioChunk;
    use crate::infrastructure::adapters::{
        FakeAudioOutput, FakeCatalogSource, FakeSynthesizer, FakeVoiceFetcher,
    };
    use tempfile::tempdir;

    const MODEL_REMOTE: &str = "en/en_US/test/medium/en_US-test-medium.onnx";
    const CONFIG_REMOTE: &str = "en/en_US/test/medium/en_US-test-medium.onnx.json";

    fn fixture_document() -> String {
        format!(
            r#"{{
                "en_US-test-medium": {{
                    "name": "test",
                    "language": {{ "code": "en_US", "name_english": "English" }},
                    "quality": "medium",
                    "num_speakers": 1,
                    "files": {{
                        "{model}": {{ "size_bytes": 4 }},
                        "{config}": {{ "size_bytes": 2 }}
                    }}
                }}
            }}"#,
            model = MODEL_REMOTE,
            config = CONFIG_REMOTE,
        )
    }

    fn fixture_tools(voice_dir: PathBuf) -> VoiceTools {
        let source = Arc::new(FakeCatalogSource::with_document(fixture_document()));
        let catalog = Arc::new(VoiceCatalogClient::new(
            source,
            CatalogClientConfig::default(),
        ));
        let fetcher = Arc::new(FakeVoiceFetcher::new());
        fetcher.set_payload(MODEL_REMOTE, b"onnx");
        fetcher.set_payload(CONFIG_REMOTE, b"{}");
        let assets = Arc::new(VoiceAssetManager::new(catalog.clone(), fetcher));
        let speaker = Arc::new(Speaker::new(
            Arc::new(FakeSynthesizer::with_chunks(vec![AudioChunk::new(
                vec![0i16; 64],
                22050,
                1,
            )])),
            Arc::new(FakeAudioOutput::new()),
        ));
        let default_model = voice_dir.join("en_US-test-medium.onnx");
        VoiceTools::new(
            catalog,
            assets,
            speaker,
            VoiceToolsConfig {
                voice_dir,
                default_model,
            },
        )
    }

    #[tokio::test]
    async fn test_list_voices_formats_table() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let output = tools.list_voices(None, None).await;
        assert!(output.contains("en_US-test-medium"));
        assert!(output.contains("Total: 1 voice(s) found"));
    }

    #[tokio::test]
    async fn test_list_voices_no_match_message() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let output = tools.list_voices(Some("fr"), None).await;
        assert!(output.starts_with("No voices found matching filters"));
        assert!(output.contains("language='fr'"));
    }

    #[tokio::test]
    async fn test_voice_info_unknown_key() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let output = tools.voice_info("xx_XX-none-low").await;
        assert!(output.starts_with("Error: Voice 'xx_XX-none-low' not found."));
    }

    #[tokio::test]
    async fn test_find_voice_for_language_name() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let output = tools
            .find_voice_for_language("english", QualityTier::Medium)
            .await;
        assert!(output.contains("Voice Key: en_US-test-medium"));
    }

    #[tokio::test]
    async fn test_download_then_speak_round_trip() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let downloaded = tools.download_voice("en_US-test-medium", None).await;
        assert!(downloaded.contains("downloaded and verified"));

        let spoken = tools
            .speak("Hello, this is a test.", None, InterruptFlag::new())
            .await;
        assert_eq!(spoken, "Successfully spoke: Hello, this is a test.");
    }

    #[tokio::test]
    async fn test_speak_with_missing_model_reports_error_string() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let output = tools
            .speak("hi", Some(dir.path().join("absent.onnx")), InterruptFlag::new())
            .await;
        assert!(output.starts_with("Error speaking text:"));
    }

    #[tokio::test]
    async fn test_downloaded_voices_listing() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let empty = tools.downloaded_voices().await;
        assert!(empty.starts_with("No voices"));

        tools.download_voice("en_US-test-medium", None).await;
        let listed = tools.downloaded_voices().await;
        assert!(listed.contains("en_US-test-medium"));
        assert!(listed.contains("Total: 1 voice(s) available locally"));
    }

    #[tokio::test]
    async fn test_auto_setup_short_circuits_when_present() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let first = tools.auto_setup_voice("english", QualityTier::Medium).await;
        assert!(first.contains("ready for use"));

        let second = tools.auto_setup_voice("english", QualityTier::Medium).await;
        assert!(second.starts_with("Voice already available"));
    }

    #[tokio::test]
    async fn test_download_unknown_voice_lists_sample() {
        let dir = tempdir().unwrap();
        let tools = fixture_tools(dir.path().to_path_buf());

        let output = tools.download_voice("nope", None).await;
        assert!(output.starts_with("Error: Voice 'nope' not found."));
        assert!(output.contains("en_US-test-medium"));
    }
}
