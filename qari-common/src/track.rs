/// Display metadata for one playable audio track.
///
/// `surah_number` is set for full-chapter audio that participates in the
/// 114-chapter sequence; it is `None` for one-off clips (e.g. a single verse),
/// which disables skip next/previous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMeta {
    pub url: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub surah_number: Option<u16>,
}

impl TrackMeta {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        subtitle: Option<String>,
        surah_number: Option<u16>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            subtitle,
            surah_number,
        }
    }

    pub fn is_first(&self) -> bool {
        self.surah_number.is_some_and(crate::is_first_surah)
    }

    pub fn is_last(&self) -> bool {
        self.surah_number.is_some_and(crate::is_last_surah)
    }
}
