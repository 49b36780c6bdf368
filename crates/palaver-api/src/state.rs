//! Application state shared by the CLI commands.
//!
//! Holds the resolved data directory and the effective configuration, and
//! knows how to open the room database and build the LLM provider. Both are
//! opened on demand so commands that need neither stay cheap.

use std::path::{Path, PathBuf};

use anyhow::Context;

use palaver_core::llm::box_provider::BoxLlmProvider;
use palaver_infra::config::load_config;
use palaver_infra::credential::{self, EnvFile};
use palaver_infra::history::json::JsonHistoryStore;
use palaver_infra::llm::create_provider;
use palaver_infra::sqlite::pool::DatabasePool;
use palaver_infra::sqlite::room::SqliteRoomRepository;
use palaver_types::config::ChatConfig;
use palaver_types::error::ConfigError;

use crate::cli::ConfigOverrides;
use crate::cli::chat::renderer::{MarkdownRenderer, RenderOptions};
use crate::cli::palette::Palette;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: ChatConfig,
}

impl AppState {
    /// Load `config.toml` from `data_dir` and apply command-line overrides.
    pub async fn init(data_dir: PathBuf, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let mut config = load_config(&data_dir).await;
        overrides.apply(&mut config);

        tracing::debug!(
            data_dir = %data_dir.display(),
            provider = %config.provider,
            model = %config.model,
            "Configuration loaded"
        );

        Ok(Self { data_dir, config })
    }

    /// Open (creating and migrating if needed) the room database.
    pub async fn open_rooms(&self) -> anyhow::Result<SqliteRoomRepository> {
        let path = Path::new(&self.config.database_file);
        let pool = DatabasePool::open(path)
            .await
            .with_context(|| format!("failed to open database {}", path.display()))?;
        Ok(SqliteRoomRepository::new(pool))
    }

    pub fn history_store(&self) -> JsonHistoryStore {
        JsonHistoryStore::new(&self.config.history_file)
    }

    pub fn renderer(&self, palette: &Palette) -> MarkdownRenderer {
        MarkdownRenderer::new(RenderOptions {
            wrap_width: self.config.wrap_width,
            code_theme: self.config.code_theme.clone(),
            color: palette.color_enabled(),
        })
    }

    /// Resolve the API credential (`.env` then the environment) and build the
    /// configured provider.
    pub fn create_provider(&self) -> anyhow::Result<BoxLlmProvider> {
        let env_file = credential::load_dotenv().context("Error loading .env file")?;
        let var = &self.config.api_key_env;

        let api_key = match credential::resolve_api_key(var) {
            Ok(key) => key,
            Err(err @ ConfigError::MissingCredential { .. }) if env_file == EnvFile::Missing => {
                return Err(anyhow::Error::new(err)
                    .context("no .env file found and the API key is not set in the environment"));
            }
            Err(err) => return Err(err.into()),
        };

        create_provider(&self.config, api_key).context("failed to create LLM provider")
    }
}
