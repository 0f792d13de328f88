mod sequence;
mod track;

pub use sequence::{is_first_surah, is_last_surah, next_surah, previous_surah, TOTAL_SURAHS};
pub use track::TrackMeta;
