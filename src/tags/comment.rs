//! Comment lookup across tag formats
//!
//! Tag formats disagree on where a free-text comment lives. ID3v2 has COMM
//! frames, Vorbis comments use `COMMENT` or `DESCRIPTION`, MP4 has `©cmt`
//! and `desc`, and some writers leave behind keys the tag library doesn't
//! map. The lookup checks, in order:
//!
//! 1. [`ItemKey::Comment`] (canonical)
//! 2. [`ItemKey::Description`]
//! 3. unmapped `COMMENT` / `DESCRIPTION` keys, any case
//!
//! A comment found anywhere but the canonical key is flagged so that the
//! next write moves it there.

use lofty::tag::{ItemKey, Tag};
use serde::Serialize;

const LEGACY_NAMES: [&str; 2] = ["COMMENT", "DESCRIPTION"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentLookup {
    pub comment: Option<String>,
    /// The comment sits under a non-canonical key and should be rewritten
    pub forced_rewrite: bool,
}

fn is_legacy_name(name: &str) -> bool {
    LEGACY_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Non-canonical keys that may hold a comment, in lookup order
pub(crate) fn legacy_keys(tag: &Tag) -> Vec<ItemKey> {
    let mut keys = vec![ItemKey::Description];
    for item in tag.items() {
        if let ItemKey::Unknown(name) = item.key() {
            if is_legacy_name(name) && !keys.contains(item.key()) {
                keys.push(item.key().clone());
            }
        }
    }
    keys
}

fn text_under(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Find the comment carried by `tag`
pub fn find_comment(tag: &Tag) -> CommentLookup {
    if let Some(comment) = text_under(tag, &ItemKey::Comment) {
        return CommentLookup {
            comment: Some(comment),
            forced_rewrite: false,
        };
    }

    legacy_keys(tag)
        .iter()
        .find_map(|key| text_under(tag, key))
        .map(|comment| CommentLookup {
            comment: Some(comment),
            forced_rewrite: true,
        })
        .unwrap_or_default()
}
