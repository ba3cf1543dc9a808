//! Reading and writing tags through lofty
//!
//! lofty maps named fields onto each container (ID3v2 frames, Vorbis
//! comments, MP4 atoms). This module only moves values between a lofty
//! [`Tag`] and a [`Track`], and attaches a [`StreamInfo`] snapshot on read.

pub mod comment;

pub use comment::{find_comment, CommentLookup};

use crate::error::{Error, Result};
use crate::mp3::{read_xing_file, EncodingMethod, ScanLimits, XingHeader};
use crate::stream::{StreamInfo, TagType};
use crate::track::Track;
use lofty::config::WriteOptions;
use lofty::file::{AudioFile, FileType, TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagItem};
use std::path::Path;
use tracing::debug;

fn tag_type_for(file_type: FileType) -> Result<TagType> {
    match file_type {
        FileType::Mpeg => Ok(TagType::Id3),
        FileType::Flac => Ok(TagType::Flac),
        FileType::Mp4 => Ok(TagType::Mp4),
        other => Err(Error::Unsupported(format!("{:?}", other))),
    }
}

fn open(path: &Path) -> Result<TaggedFile> {
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    Ok(Probe::open(path)?.read()?)
}

/// Read tags and stream facts with the default scan limits
pub fn read_tags<P: AsRef<Path>>(path: P) -> Result<Track> {
    read_tags_with(path, &ScanLimits::default())
}

pub fn read_tags_with<P: AsRef<Path>>(path: P, limits: &ScanLimits) -> Result<Track> {
    let path = path.as_ref();
    let tagged = open(path)?;
    let tag_type = tag_type_for(tagged.file_type())?;

    let stream_info = stream_info(path, &tagged, tag_type, limits)?;

    let mut track = tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .map(track_from_tag)
        .unwrap_or_default();
    track.stream_info = Some(stream_info);
    track.normalize();

    Ok(track)
}

fn stream_info(
    path: &Path,
    tagged: &TaggedFile,
    tag_type: TagType,
    limits: &ScanLimits,
) -> Result<StreamInfo> {
    let props = tagged.properties();
    let length_seconds = props.duration().as_secs_f64();
    let bitrate = props
        .overall_bitrate()
        .or_else(|| props.audio_bitrate())
        .unwrap_or(0)
        .saturating_mul(1000);

    let (bits_per_sample, mp3_method, xing) = match tag_type {
        TagType::Flac => (props.bit_depth().map(u32::from), None, None),
        TagType::Id3 => {
            let xing = read_xing_file(path, limits)?;
            (None, Some(mp3_method(&xing)), Some(xing))
        }
        _ => (None, None, None),
    };

    debug!(path = %path.display(), %tag_type, length_seconds, bitrate, "read stream info");
    StreamInfo::new(tag_type, length_seconds, bitrate, bits_per_sample, mp3_method, xing)
}

/// Bitrate mode from the header hint, or the header's own method when the
/// hint can't tell
fn mp3_method(xing: &XingHeader) -> EncodingMethod {
    match xing.bitrate_mode() {
        EncodingMethod::Unknown => xing.method(),
        mode => mode,
    }
}

fn strings(tag: &Tag, key: &ItemKey) -> Vec<String> {
    tag.get_strings(key).map(str::to_string).collect()
}

fn string(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key).map(str::to_string)
}

/// Copy the fields this crate understands out of a lofty tag
pub fn track_from_tag(tag: &Tag) -> Track {
    Track {
        artists: strings(tag, &ItemKey::TrackArtist),
        release_artists: strings(tag, &ItemKey::AlbumArtist),
        date: string(tag, &ItemKey::RecordingDate),
        release_title: string(tag, &ItemKey::AlbumTitle),
        track_title: string(tag, &ItemKey::TrackTitle),
        track_number: tag.track(),
        total_tracks: tag.track_total(),
        disc_number: tag.disk(),
        total_discs: tag.disk_total(),
        genres: strings(tag, &ItemKey::Genre),
        comment: find_comment(tag).comment,
        stream_info: None,
    }
}

fn set_strings(tag: &mut Tag, key: ItemKey, values: &[String]) {
    tag.remove_key(&key);
    for value in values {
        tag.push(TagItem::new(key.clone(), ItemValue::Text(value.clone())));
    }
}

fn set_string(tag: &mut Tag, key: ItemKey, value: Option<&str>) {
    match value {
        Some(text) => {
            tag.insert_text(key, text.to_string());
        }
        None => {
            tag.remove_key(&key);
        }
    }
}

/// Write every field of `track` into `tag`, removing fields it doesn't set.
///
/// Totals are only kept alongside their number.
pub fn apply_track(tag: &mut Tag, track: &Track) {
    set_strings(tag, ItemKey::TrackArtist, &track.artists);
    set_strings(tag, ItemKey::AlbumArtist, &track.release_artists);
    set_string(tag, ItemKey::RecordingDate, track.date.as_deref());
    set_string(tag, ItemKey::AlbumTitle, track.release_title.as_deref());
    set_string(tag, ItemKey::TrackTitle, track.track_title.as_deref());
    set_strings(tag, ItemKey::Genre, &track.genres);

    tag.remove_track_total();
    match track.track_number {
        Some(number) => {
            tag.set_track(number);
            if let Some(total) = track.total_tracks {
                tag.set_track_total(total);
            }
        }
        None => tag.remove_track(),
    }

    tag.remove_disk_total();
    match track.disc_number {
        Some(number) => {
            tag.set_disk(number);
            if let Some(total) = track.total_discs {
                tag.set_disk_total(total);
            }
        }
        None => tag.remove_disk(),
    }

    for key in comment::legacy_keys(tag) {
        tag.remove_key(&key);
    }
    set_string(tag, ItemKey::Comment, track.comment.as_deref());
}

/// Write `track`'s tag fields to the file at `path`.
///
/// The track is validated and normalized first. A file without a tag gets
/// one of its format's primary type.
pub fn write_tags<P: AsRef<Path>>(path: P, track: &Track) -> Result<()> {
    let path = path.as_ref();
    track.check()?;
    let mut track = track.clone();
    track.normalize();

    let mut tagged = open(path)?;
    tag_type_for(tagged.file_type())?;

    let primary = tagged.primary_tag_type();
    if tagged.primary_tag().is_none() {
        debug!(path = %path.display(), ?primary, "creating tag");
        tagged.insert_tag(Tag::new(primary));
    }

    let tag = tagged
        .primary_tag_mut()
        .ok_or_else(|| Error::Unsupported(format!("no writable {:?} tag", primary)))?;
    apply_track(tag, &track);

    tagged.save_to_path(path, WriteOptions::default())?;
    debug!(path = %path.display(), "tags written");
    Ok(())
}
