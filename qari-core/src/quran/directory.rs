//! Surah metadata lookup.
//!
//! Skip next/previous resolves the neighboring chapter's display name through
//! [`SurahDirectory`]. Lookup failure never blocks a skip: callers fall back
//! to a generic `Surah N` label instead.

use async_trait::async_trait;
use qari_common::TOTAL_SURAHS;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Shared HTTP client for all directory requests.
fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .user_agent("qari/0.1")
            .build()
            .expect("Failed to create HTTP client")
    })
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Surah number {0} out of range 1..=114")]
    OutOfRange(u16),
    #[error("Directory API error: {0}")]
    Api(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Chapter metadata used for player display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurahInfo {
    pub number: u16,
    /// Arabic name
    pub name: String,
    pub english_name: String,
    pub verse_count: u32,
}

impl SurahInfo {
    /// Display title, e.g. `Ya-Sin (يس)`.
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            self.english_name.clone()
        } else {
            format!("{} ({})", self.english_name, self.name)
        }
    }

    /// Display subtitle, e.g. `Complete Surah • 83 Verses`.
    pub fn subtitle(&self) -> String {
        if self.verse_count == 0 {
            "Complete Surah".to_string()
        } else {
            format!("Complete Surah • {} Verses", self.verse_count)
        }
    }

    /// Generic labels used when the lookup fails.
    pub fn fallback(number: u16) -> Self {
        Self {
            number,
            name: String::new(),
            english_name: format!("Surah {number}"),
            verse_count: 0,
        }
    }
}

/// Chapter metadata lookup, keyed by surah number.
#[async_trait]
pub trait SurahDirectory: Send + Sync + 'static {
    async fn surah(&self, number: u16) -> Result<SurahInfo, DirectoryError>;
}

#[derive(Deserialize)]
struct ApiEnvelope {
    code: u16,
    data: ApiSurah,
}

#[derive(Deserialize)]
struct ApiSurah {
    number: u16,
    name: String,
    #[serde(rename = "englishName")]
    english_name: String,
    #[serde(rename = "numberOfAyahs")]
    number_of_ayahs: u32,
}

/// Directory backed by the alquran.cloud REST API.
#[derive(Debug, Clone)]
pub struct AlQuranCloud {
    base_url: String,
}

impl AlQuranCloud {
    pub fn new() -> Self {
        Self {
            base_url: "https://api.alquran.cloud/v1".to_string(),
        }
    }

    /// Point the client at a different server (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for AlQuranCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SurahDirectory for AlQuranCloud {
    async fn surah(&self, number: u16) -> Result<SurahInfo, DirectoryError> {
        if number < 1 || number > TOTAL_SURAHS {
            return Err(DirectoryError::OutOfRange(number));
        }
        let url = format!("{}/surah/{}", self.base_url, number);
        debug!("Directory request: {}", url);
        let response = http_client().get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DirectoryError::Api(format!(
                "HTTP {} for surah {}",
                response.status(),
                number
            )));
        }
        let envelope: ApiEnvelope = response.json().await?;
        if envelope.code != 200 {
            return Err(DirectoryError::Api(format!(
                "API code {} for surah {}",
                envelope.code, number
            )));
        }
        Ok(SurahInfo {
            number: envelope.data.number,
            name: envelope.data.name,
            english_name: envelope.data.english_name,
            verse_count: envelope.data.number_of_ayahs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_labels() {
        let info = SurahInfo::fallback(37);
        assert_eq!(info.title(), "Surah 37");
        assert_eq!(info.subtitle(), "Complete Surah");
    }

    #[test]
    fn test_display_labels() {
        let info = SurahInfo {
            number: 36,
            name: "يس".to_string(),
            english_name: "Ya-Sin".to_string(),
            verse_count: 83,
        };
        assert_eq!(info.title(), "Ya-Sin (يس)");
        assert_eq!(info.subtitle(), "Complete Surah • 83 Verses");
    }

    #[test]
    fn test_envelope_parsing() {
        let json = r#"{
            "code": 200,
            "status": "OK",
            "data": {
                "number": 1,
                "name": "الفاتحة",
                "englishName": "Al-Faatiha",
                "englishNameTranslation": "The Opening",
                "numberOfAyahs": 7,
                "revelationType": "Meccan",
                "ayahs": []
            }
        }"#;
        let envelope: ApiEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 200);
        assert_eq!(envelope.data.number, 1);
        assert_eq!(envelope.data.english_name, "Al-Faatiha");
        assert_eq!(envelope.data.number_of_ayahs, 7);
    }
}
