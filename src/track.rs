//! Track metadata model
//!
//! A [`Track`] is the format-independent view of a file's tags. Equality
//! compares the tag fields only: two files carrying the same tags are the
//! same track whatever their stream looks like.

use crate::codec::CodecDescriptor;
use crate::error::{Error, Result};
use crate::stream::StreamInfo;
use serde::Serialize;
use std::fmt;

/// Characters that are unsafe in filenames on at least one common platform,
/// with the look-alike each is replaced by
const PATH_CHAR_REPLACEMENTS: [(char, char); 9] = [
    (':', '\u{FF1A}'),  // ：
    ('/', '\u{2215}'),  // ∕
    ('\\', '\u{29F5}'), // ⧵
    ('*', '\u{FF0A}'),  // ＊
    ('?', '\u{FF1F}'),  // ？
    ('"', '\u{FF02}'),  // ＂
    ('<', '\u{FF1C}'),  // ＜
    ('>', '\u{FF1E}'),  // ＞
    ('|', '\u{FF5C}'),  // ｜
];

/// Replace filesystem-hostile characters with visually similar ones
pub fn normalize_path_chars(name: &str) -> String {
    name.chars()
        .map(|c| {
            PATH_CHAR_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Track {
    pub artists: Vec<String>,
    pub release_artists: Vec<String>,
    pub date: Option<String>,
    pub release_title: Option<String>,
    pub track_title: Option<String>,
    pub track_number: Option<u32>,
    pub total_tracks: Option<u32>,
    pub disc_number: Option<u32>,
    pub total_discs: Option<u32>,
    pub genres: Vec<String>,
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_info: Option<StreamInfo>,
}

fn dedupe(values: &mut Vec<String>) {
    let mut seen = Vec::with_capacity(values.len());
    values.retain(|v| {
        if v.is_empty() || seen.contains(v) {
            false
        } else {
            seen.push(v.clone());
            true
        }
    });
}

fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().is_some_and(str::is_empty) {
        *value = None;
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop empty values and duplicate list entries, keeping first-seen order
    pub fn normalize(&mut self) {
        dedupe(&mut self.artists);
        dedupe(&mut self.release_artists);
        dedupe(&mut self.genres);
        blank_to_none(&mut self.date);
        blank_to_none(&mut self.release_title);
        blank_to_none(&mut self.track_title);
        blank_to_none(&mut self.comment);
    }

    /// Reject values no tag writer should store
    pub fn check(&self) -> Result<()> {
        let lists = [&self.artists, &self.release_artists, &self.genres];
        if lists.iter().any(|list| list.iter().any(String::is_empty)) {
            return Err(Error::InvalidTrack("empty entry in artist or genre list"));
        }
        if self.track_title.as_deref() == Some("") {
            return Err(Error::InvalidTrack("empty track title"));
        }

        let numbers = [
            (self.track_number, "track number must be positive"),
            (self.total_tracks, "total tracks must be positive"),
            (self.disc_number, "disc number must be positive"),
            (self.total_discs, "total discs must be positive"),
        ];
        for (value, message) in numbers {
            if value == Some(0) {
                return Err(Error::InvalidTrack(message));
            }
        }

        Ok(())
    }

    /// Whether the track has everything a tidy library entry needs
    pub fn is_complete(&self) -> bool {
        !self.artists.is_empty()
            && !self.release_artists.is_empty()
            && has_text(&self.date)
            && has_text(&self.release_title)
            && self.track_number.is_some_and(|n| n > 0)
            && has_text(&self.track_title)
    }

    pub fn codec_descriptor(&self) -> Option<CodecDescriptor> {
        self.stream_info.as_ref().map(StreamInfo::codec_descriptor)
    }

    /// e.g. "V0" (short) or "MP3 V0"; `None` without stream info
    pub fn codec_setting(&self, short: bool) -> Option<String> {
        self.codec_descriptor().map(|d| d.label(short))
    }

    /// Suggested filename: `[disc]NN - [artists - ]title.ext`.
    ///
    /// The disc number is only prefixed on multi-disc releases. Returns
    /// `None` when the track number, title or stream info is missing.
    pub fn filename(&self, include_artist: bool) -> Option<String> {
        let number = self.track_number?;
        let title = self.track_title.as_deref().filter(|t| !t.is_empty())?;
        let ext = self.stream_info.as_ref()?.extension();

        let disc = match (self.disc_number, self.total_discs) {
            (Some(disc), Some(total)) if total > 1 => disc.to_string(),
            _ => String::new(),
        };

        let name = if include_artist {
            format!(
                "{}{:02} - {} - {}.{}",
                disc,
                number,
                self.artists.join(", "),
                title,
                ext
            )
        } else {
            format!("{}{:02} - {}.{}", disc, number, title, ext)
        };

        Some(normalize_path_chars(&name))
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.artists == other.artists
            && self.release_artists == other.release_artists
            && self.date == other.date
            && self.release_title == other.release_title
            && self.track_title == other.track_title
            && self.track_number == other.track_number
            && self.total_tracks == other.total_tracks
            && self.disc_number == other.disc_number
            && self.total_discs == other.total_discs
            && self.genres == other.genres
            && self.comment == other.comment
    }
}

impl Eq for Track {}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(values: &[String]) -> String {
            if values.is_empty() {
                "-".to_string()
            } else {
                format!("[{}]", values.join(", "))
            }
        }
        fn text(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("-")
        }
        fn number(value: Option<u32>) -> String {
            value.map_or_else(|| "-".to_string(), |n| n.to_string())
        }

        writeln!(f, "Artists:          {}", list(&self.artists))?;
        writeln!(f, "Release artists:  {}", list(&self.release_artists))?;
        writeln!(f, "Date:             {}", text(&self.date))?;
        writeln!(f, "Release title:    {}", text(&self.release_title))?;
        writeln!(f, "Track title:      {}", text(&self.track_title))?;
        writeln!(
            f,
            "Track:            {}/{}",
            number(self.track_number),
            number(self.total_tracks)
        )?;
        writeln!(
            f,
            "Disc:             {}/{}",
            number(self.disc_number),
            number(self.total_discs)
        )?;
        writeln!(f, "Genres:           {}", list(&self.genres))?;
        writeln!(f, "Comment:          {}", text(&self.comment))?;
        match &self.stream_info {
            Some(info) => write!(f, "Stream:           {}", info),
            None => write!(f, "Stream:           -"),
        }
    }
}
