mod audio;
mod directory;

pub use audio::{surah_audio_url, verse_audio_url, ReciterId, DEFAULT_BITRATE_KBPS};
pub use directory::{AlQuranCloud, DirectoryError, SurahDirectory, SurahInfo};
