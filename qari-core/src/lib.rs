pub mod playback;
pub mod quran;
