//! Piperline - Piper 语音流水线命令行入口
//!
//! 装配顺序: 配置 → 日志 → 适配器 → 工具门面 → 子命令分发

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use piperline::application::{
    CatalogClientConfig, InterruptFlag, Speaker, VoiceAssetManager, VoiceCatalogClient, VoiceTools,
    VoiceToolsConfig,
};
use piperline::config::{load_config, print_config};
use piperline::domain::voice::QualityTier;
use piperline::infrastructure::adapters::{
    HttpCatalogSource, HttpCatalogSourceConfig, HttpVoiceFetcher, HttpVoiceFetcherConfig,
    PiperSynthesizer, RodioAudioOutput,
};

#[derive(Parser)]
#[command(
    name = "piperline",
    about = "Streaming Piper text-to-speech with voice model management"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 合成并实时播放一段文本（Ctrl+C 中断）
    Speak {
        /// 要朗读的文本
        text: String,
        /// Piper 模型路径 (.onnx)，缺省用配置中的默认模型
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// 列出目录中的可用语音
    List {
        /// 语言代码前缀过滤，如 en 或 en_US
        #[arg(long)]
        language: Option<String>,
        /// 音质过滤: x_low / low / medium / high
        #[arg(long)]
        quality: Option<QualityTier>,
    },
    /// 查看一个语音的详细信息
    Info {
        /// 语音 key，如 en_US-lessac-medium
        voice_key: String,
    },
    /// 为语言查找最佳语音
    Find {
        /// 语言名称或代码，如 french 或 fr_FR
        language: String,
        #[arg(long, default_value = "medium")]
        quality: QualityTier,
    },
    /// 下载并校验一个语音模型
    Download {
        voice_key: String,
        /// 保存目录，缺省用配置中的语音目录
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// 查找并下载语音（一步完成）
    Setup {
        language: String,
        #[arg(long, default_value = "medium")]
        quality: QualityTier,
    },
    /// 列出本地已下载的语音
    Downloaded,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!("{},piperline={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();
    print_config(&config);

    // 装配目录客户端
    let catalog_source = Arc::new(HttpCatalogSource::new(HttpCatalogSourceConfig {
        url: config.catalog.url.clone(),
        timeout_secs: config.catalog.timeout_secs,
    })?);
    let catalog = Arc::new(VoiceCatalogClient::new(
        catalog_source,
        CatalogClientConfig {
            refresh_secs: config.catalog.refresh_secs,
        },
    ));

    // 装配资产管理器
    let fetcher = Arc::new(HttpVoiceFetcher::new(HttpVoiceFetcherConfig {
        base_url: config.store.base_url.clone(),
        user_agent: config.store.user_agent.clone(),
        timeout_secs: config.store.timeout_secs,
    })?);
    let assets = Arc::new(VoiceAssetManager::new(catalog.clone(), fetcher));

    // 装配播放器
    let speaker = Arc::new(Speaker::new(
        Arc::new(PiperSynthesizer::new()),
        Arc::new(RodioAudioOutput::new()),
    ));

    let tools = VoiceTools::new(
        catalog,
        assets,
        speaker,
        VoiceToolsConfig {
            voice_dir: config.store.voice_dir.clone(),
            default_model: config.audio.default_model.clone(),
        },
    );

    let output = match cli.command {
        Command::Speak { text, model } => {
            // Ctrl+C 触发播放中断
            let interrupt = InterruptFlag::new();
            let ctrlc_flag = interrupt.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrlc_flag.trigger();
                }
            });
            tools.speak(&text, model, interrupt).await
        }
        Command::List { language, quality } => {
            tools.list_voices(language.as_deref(), quality).await
        }
        Command::Info { voice_key } => tools.voice_info(&voice_key).await,
        Command::Find { language, quality } => {
            tools.find_voice_for_language(&language, quality).await
        }
        Command::Download {
            voice_key,
            output_dir,
        } => tools.download_voice(&voice_key, output_dir).await,
        Command::Setup { language, quality } => tools.auto_setup_voice(&language, quality).await,
        Command::Downloaded => tools.downloaded_voices().await,
    };

    println!("{}", output);
    Ok(())
}
