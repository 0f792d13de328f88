use async_trait::async_trait;
use qari_core::quran::{DirectoryError, SurahDirectory, SurahInfo};
use std::sync::{Arc, Once};

pub fn tracing_init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// In-memory surah directory. Returns deterministic "Chapter N" metadata,
/// or errors on every lookup when constructed with `failing()`.
pub struct MockDirectory {
    fail: bool,
}

impl MockDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true })
    }
}

#[async_trait]
impl SurahDirectory for MockDirectory {
    async fn surah(&self, number: u16) -> Result<SurahInfo, DirectoryError> {
        if self.fail {
            return Err(DirectoryError::Api("directory offline".to_string()));
        }
        Ok(SurahInfo {
            number,
            name: String::new(),
            english_name: format!("Chapter {number}"),
            verse_count: u32::from(number) + 3,
        })
    }
}
