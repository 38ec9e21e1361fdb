use std::path::{Path, PathBuf};
use std::sync::Arc;

use kieli_config::Config;
use kieli_core::document::{Document, NodeId};
use kieli_core::session::SharedDocument;
use kieli_core::vocabulary::{MemoryVocabulary, VocabularyStore};
use kieli_types::VocabularyEntry;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub vocabulary: RwLock<MemoryVocabulary>,
    pub document: SharedDocument,
    /// Container the session annotates; paragraphs are appended here
    pub region: NodeId,
    pub color: bool,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let vocabulary = load_vocabulary(config.vocabulary.path.as_deref().map(Path::new))?;

        let mut document = Document::new();
        let root = document.root();
        let region = document.create_element("div");
        document.set_attribute(region, "class", "kieli-region")?;
        document.append_child(root, region)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            vocabulary: RwLock::new(vocabulary),
            document: Arc::new(RwLock::new(document)),
            region,
            color: atty::is(atty::Stream::Stdout),
        })
    }

    /// Active entries for the configured language pair
    pub async fn active_entries(&self) -> Vec<VocabularyEntry> {
        let (native, learning) = {
            let config = self.config.read().await;
            (
                config.vocabulary.native_lang.clone(),
                config.vocabulary.learning_lang.clone(),
            )
        };
        self.vocabulary.read().await.by_language_pair(&native, &learning)
    }

    /// Write the store back if a vocabulary file is configured
    pub async fn save_vocabulary(&self) -> anyhow::Result<()> {
        let path = self.config.read().await.vocabulary.path.clone();
        let Some(path) = path else {
            return Ok(());
        };
        self.vocabulary
            .read()
            .await
            .save_to_file(&PathBuf::from(path))?;
        Ok(())
    }
}

/// Configured file if it exists, the sample list otherwise
fn load_vocabulary(path: Option<&Path>) -> anyhow::Result<MemoryVocabulary> {
    match path {
        Some(path) if path.exists() => Ok(MemoryVocabulary::load_from_file(path)?),
        Some(path) => {
            tracing::warn!(
                "Vocabulary file {} not found, starting from the sample list",
                path.display()
            );
            Ok(MemoryVocabulary::with_defaults())
        }
        None => {
            let store = MemoryVocabulary::with_defaults();
            tracing::info!("Using sample vocabulary ({} active)", store.active_count());
            Ok(store)
        }
    }
}
