//! Deterministic audio CDN URL patterns.
//!
//! The CDN keys full-chapter audio by surah number and per-verse audio by
//! the verse's global number across the whole text; both are parameterized
//! by reciter and bitrate.

const CDN_BASE: &str = "https://cdn.islamic.network/quran";

pub const DEFAULT_BITRATE_KBPS: u32 = 128;

/// Audio-CDN voice track variant. A plain URL parameter, not stateful
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReciterId(pub String);

impl ReciterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReciterId {
    fn default() -> Self {
        Self("ar.alafasy".to_string())
    }
}

impl std::fmt::Display for ReciterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL of the full-chapter recording for one surah.
pub fn surah_audio_url(reciter: &ReciterId, bitrate_kbps: u32, surah_number: u16) -> String {
    format!("{CDN_BASE}/audio-surah/{bitrate_kbps}/{reciter}/{surah_number}.mp3")
}

/// URL of a single verse clip, keyed by the verse's global number.
pub fn verse_audio_url(reciter: &ReciterId, bitrate_kbps: u32, global_verse_number: u32) -> String {
    format!("{CDN_BASE}/audio/{bitrate_kbps}/{reciter}/{global_verse_number}.mp3")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surah_url_pattern() {
        let url = surah_audio_url(&ReciterId::default(), DEFAULT_BITRATE_KBPS, 36);
        assert_eq!(
            url,
            "https://cdn.islamic.network/quran/audio-surah/128/ar.alafasy/36.mp3"
        );
    }

    #[test]
    fn test_verse_url_pattern() {
        let url = verse_audio_url(&ReciterId::new("ar.sudais"), 64, 262);
        assert_eq!(
            url,
            "https://cdn.islamic.network/quran/audio/64/ar.sudais/262.mp3"
        );
    }
}
