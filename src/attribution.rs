//! YouTube attribution: which videos produced leads, calls and cash.
//!
//! Leads carry the landing link they arrived through; sales are joined to leads
//! by lowercased name and then grouped by the lead's video id.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::archive::ArchivedVideos;
use crate::records::{Lead, Sale, Video};
use crate::types::Money;

const VIDEO_ID_LEN: usize = 11;

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Whether `s` looks like a bare YouTube video id.
#[must_use]
pub fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN && s.chars().all(is_id_char)
}

/// Leading id characters of `s`, if they form a full video id.
fn leading_id(s: &str) -> Option<String> {
    let id: String = s.chars().take_while(|c| is_id_char(*c)).collect();
    is_video_id(&id).then_some(id)
}

/// Parse a lead's landing link, allowing a missing scheme.
fn parse_link(source: &str) -> Option<Url> {
    match Url::parse(source) {
        Ok(link) => Some(link),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{source}")).ok()
        }
        Err(_) => None,
    }
}

/// Decoded value of query parameter `key`.
fn query_value(link: &Url, key: &str) -> Option<String> {
    link.query_pairs()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.into_owned())
}

/// Extract a video id from a watch/short/embed URL, a `utm_content` tag, or a bare id.
///
/// `utm_content` values are taken verbatim after form-decoding, the same way
/// dashboard query strings decode.
#[must_use]
pub fn extract_video_id(source: &str) -> Option<String> {
    let source = source.trim();
    if source.is_empty() {
        return None;
    }
    if is_video_id(source) {
        return Some(source.to_string());
    }

    let link = parse_link(source)?;
    if let Some(content) = query_value(&link, "utm_content").filter(|v| !v.is_empty()) {
        return Some(content);
    }

    let segments: Vec<&str> = link
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if link.host_str() == Some("youtu.be") {
        return segments.first().and_then(|id| leading_id(id));
    }
    if let Some(pos) = segments
        .iter()
        .position(|seg| matches!(*seg, "shorts" | "embed" | "live"))
    {
        return segments.get(pos + 1).and_then(|id| leading_id(id));
    }
    query_value(&link, "v").and_then(|v| leading_id(&v))
}

/// Attribution totals for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoStats {
    pub video_id: String,
    pub title: Option<String>,
    pub leads: usize,
    pub calls: usize,
    pub cash: Money,
}

fn join_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Attribute leads and sales to videos.
///
/// Each lead with a video id counts toward that video; the first such lead
/// for a name decides where that person's sales go. Archived videos are left
/// out. Results are ordered by cash, then leads, descending.
pub fn attribute<'a>(
    leads: impl IntoIterator<Item = &'a Lead>,
    sales: impl IntoIterator<Item = &'a Sale>,
    archived: &ArchivedVideos,
) -> Vec<VideoStats> {
    let mut stats: BTreeMap<String, VideoStats> = BTreeMap::new();
    let mut video_by_name: HashMap<String, String> = HashMap::new();

    for lead in leads {
        let Some(video_id) = lead.video_id() else {
            continue;
        };
        if archived.contains(&video_id) {
            continue;
        }
        video_by_name
            .entry(join_key(&lead.name))
            .or_insert_with(|| video_id.clone());
        let entry = stats.entry(video_id.clone()).or_insert_with(|| VideoStats {
            video_id,
            ..VideoStats::default()
        });
        entry.leads += 1;
    }

    let mut unmatched = 0usize;
    for sale in sales {
        match video_by_name.get(&join_key(&sale.name)).and_then(|id| stats.get_mut(id)) {
            Some(entry) => {
                entry.calls += 1;
                entry.cash += sale.cash();
            }
            None => unmatched += 1,
        }
    }
    debug!(videos = stats.len(), unmatched, "attributed sales to videos");

    let mut result: Vec<VideoStats> = stats.into_values().collect();
    result.sort_by(|a, b| {
        b.cash
            .get()
            .total_cmp(&a.cash.get())
            .then(b.leads.cmp(&a.leads))
            .then_with(|| a.video_id.cmp(&b.video_id))
    });
    result
}

/// Fill in titles from the videos sheet.
pub fn attach_titles(stats: &mut [VideoStats], videos: &[Video]) {
    let titles: HashMap<String, &str> = videos
        .iter()
        .filter_map(|v| v.video_id().map(|id| (id, v.title.as_str())))
        .collect();
    for entry in stats {
        if let Some(title) = titles.get(&entry.video_id) {
            entry.title = Some((*title).to_string());
        }
    }
}
