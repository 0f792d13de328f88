/// Number of chapters (surahs) in the Quran; the fixed length of the
/// sequential-playback ordering.
pub const TOTAL_SURAHS: u16 = 114;

pub fn is_first_surah(number: u16) -> bool {
    number == 1
}

pub fn is_last_surah(number: u16) -> bool {
    number == TOTAL_SURAHS
}

/// Next chapter in the sequence, or `None` at the end.
pub fn next_surah(number: u16) -> Option<u16> {
    if number >= 1 && number < TOTAL_SURAHS {
        Some(number + 1)
    } else {
        None
    }
}

/// Previous chapter in the sequence, or `None` at the start.
pub fn previous_surah(number: u16) -> Option<u16> {
    if number > 1 && number <= TOTAL_SURAHS {
        Some(number - 1)
    } else {
        None
    }
}
