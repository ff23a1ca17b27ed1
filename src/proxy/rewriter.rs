//! Line-by-line HLS playlist rewriting.
//!
//! Walks fetched playlist text in a single forward pass and substitutes
//! every sub-playlist, segment, and key reference with a proxy-relative URL.
//! Non-reference lines are emitted verbatim: the output has exactly the same
//! lines, in the same order, as the input (modulo an optional debug banner).

use crate::proxy::resolver::{self, BaseContext};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Tag that marks a master playlist; its variant URL follows on the next line.
const STREAM_INF_TAG: &str = "#EXT-X-STREAM-INF";
/// Tag that marks a media playlist (per-segment duration info).
const EXTINF_TAG: &str = "#EXTINF";
/// Tag carrying the encryption key URI as a quoted attribute.
const KEY_TAG: &str = "#EXT-X-KEY";

/// File extensions that identify a media-segment reference line.
const SEGMENT_EXTENSIONS: [&str; 5] = [".ts", ".aac", ".m4s", ".mp4", ".vtt"];

/// Quoted `URI="..."` attribute inside an #EXT-X-KEY tag.
static KEY_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"URI="([^"]+)""#).expect("static pattern compiles"));

/// Diagnostic banner prepended to rewritten playlists when `debug=true`.
const DEBUG_BANNER: [&str; 4] = [
    "#EXTM3U",
    "#EXT-X-VERSION:3",
    "#EXT-X-INDEPENDENT-SEGMENTS",
    "## rewritten by streamgate",
];

/// Playlist classification, determined once per document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaylistKind {
    /// Lists variant sub-playlists (contains #EXT-X-STREAM-INF)
    Master,
    /// Lists media segments (contains #EXTINF)
    Media,
}

impl PlaylistKind {
    /// Detect the playlist kind from raw text.
    ///
    /// Returns `None` when neither marker is present — the caller passes
    /// such content through untouched (fail-open).
    pub fn detect(content: &str) -> Option<Self> {
        if content.contains(STREAM_INF_TAG) {
            Some(Self::Master)
        } else if content.contains(EXTINF_TAG) {
            Some(Self::Media)
        } else {
            None
        }
    }
}

/// Master-playlist scan state.
///
/// #EXT-X-STREAM-INF and its variant URL sit on separate lines; this state
/// carries "the next content line is the reference" across the forward pass.
#[derive(Clone, Copy, Debug, PartialEq)]
enum ScanState {
    Idle,
    ExpectingUri,
}

/// Rewrite a fetched playlist so every reference routes through the proxy.
///
/// `source_url` is the URL the playlist was fetched from (relative-reference
/// base); `base_path` is the public prefix for rewritten URLs (usually empty).
/// Unrecognized content is returned byte-for-byte unchanged.
///
/// Already-absolute references are rewritten to proxy form like any other:
/// all traffic must flow through the proxy or CORS and key fetches break.
pub fn rewrite_playlist(content: &str, source_url: &str, base_path: &str, debug: bool) -> String {
    let Some(kind) = PlaylistKind::detect(content) else {
        debug!("No playlist markers found, passing content through verbatim");
        return content.to_string();
    };

    let base = BaseContext::from_source_url(source_url);
    debug!(
        "Rewriting {:?} playlist from {} (origin {}, dir {})",
        kind, source_url, base.origin, base.directory_path
    );

    let body = match kind {
        PlaylistKind::Master => rewrite_master(content, &base, base_path),
        PlaylistKind::Media => rewrite_media(content, &base, base_path),
    };

    if debug {
        format!("{}\n{}", DEBUG_BANNER.join("\n"), body)
    } else {
        body
    }
}

/// Build a proxy-relative URL for a resolved upstream reference.
fn proxied_url(base_path: &str, route: &str, upstream_url: &str) -> String {
    format!(
        "{}{}?url={}",
        base_path,
        route,
        urlencoding::encode(upstream_url)
    )
}

/// Single forward pass over a master playlist.
///
/// Variant references point at sub-playlists, so they are rewritten to the
/// `/hls` route (the sub-playlist needs rewriting in turn when fetched).
fn rewrite_master(content: &str, base: &BaseContext, base_path: &str) -> String {
    let mut state = ScanState::Idle;

    let lines: Vec<String> = content
        .lines()
        .map(|line| {
            let trimmed = line.trim();

            if trimmed.starts_with(STREAM_INF_TAG) {
                state = ScanState::ExpectingUri;
                return line.to_string();
            }

            if state == ScanState::ExpectingUri && !trimmed.is_empty() && !trimmed.starts_with('#')
            {
                state = ScanState::Idle;
                let resolved = resolver::resolve(base, trimmed);
                return proxied_url(base_path, "/hls", &resolved);
            }

            line.to_string()
        })
        .collect();

    lines.join("\n")
}

/// Single forward pass over a media playlist.
///
/// No carried state: segment lines self-identify by extension and key lines
/// by tag prefix, so each line classifies independently.
fn rewrite_media(content: &str, base: &BaseContext, base_path: &str) -> String {
    let lines: Vec<String> = content
        .lines()
        .map(|line| {
            let trimmed = line.trim();

            if trimmed.starts_with(KEY_TAG) {
                return rewrite_key_line(line, base, base_path);
            }

            if !trimmed.is_empty() && !trimmed.starts_with('#') && is_segment_reference(trimmed) {
                let resolved = resolver::resolve(base, trimmed);
                return proxied_url(base_path, "/segment", &resolved);
            }

            line.to_string()
        })
        .collect();

    lines.join("\n")
}

/// True when the line references a recognized media-segment file type.
fn is_segment_reference(line: &str) -> bool {
    SEGMENT_EXTENSIONS.iter().any(|ext| line.contains(ext))
}

/// Rewrite the quoted URI value of an #EXT-X-KEY line in place.
///
/// Every other attribute and the surrounding quotes are preserved byte-exact.
/// A key line without a parsable `URI="..."` attribute is emitted verbatim.
fn rewrite_key_line(line: &str, base: &BaseContext, base_path: &str) -> String {
    match KEY_URI_RE.captures(line).and_then(|caps| caps.get(1)) {
        Some(uri) => {
            let resolved = resolver::resolve(base, uri.as_str());
            format!(
                "{}{}{}",
                &line[..uri.start()],
                proxied_url(base_path, "/segment", &resolved),
                &line[uri.end()..]
            )
        }
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=100000\nvideo.m3u8";

    const MEDIA: &str = "#EXTM3U\n\
        #EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"\n\
        #EXTINF:10.0,\n\
        seg1.ts";

    #[test]
    fn detects_master_playlist() {
        assert_eq!(PlaylistKind::detect(MASTER), Some(PlaylistKind::Master));
    }

    #[test]
    fn detects_media_playlist() {
        assert_eq!(PlaylistKind::detect(MEDIA), Some(PlaylistKind::Media));
    }

    #[test]
    fn master_marker_wins_over_media_marker() {
        let both = "#EXT-X-STREAM-INF:BANDWIDTH=1\n#EXTINF:10.0,\n";
        assert_eq!(PlaylistKind::detect(both), Some(PlaylistKind::Master));
    }

    #[test]
    fn master_variant_rewritten_to_hls_route() {
        let out = rewrite_playlist(MASTER, "https://ex.com/a/master.m3u8", "", false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(lines[1], "#EXT-X-STREAM-INF:BANDWIDTH=100000");
        assert_eq!(lines[2], "/hls?url=https%3A%2F%2Fex.com%2Fa%2Fvideo.m3u8");
    }

    #[test]
    fn master_rewrite_honors_base_path() {
        let out = rewrite_playlist(MASTER, "https://ex.com/a/master.m3u8", "/api", false);
        assert!(out.contains("/api/hls?url="));
    }

    #[test]
    fn master_comment_between_tag_and_uri_skipped() {
        let input = "#EXT-X-STREAM-INF:BANDWIDTH=1\n# a comment\n\nlow/index.m3u8";
        let out = rewrite_playlist(input, "https://ex.com/master.m3u8", "", false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "# a comment");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "/hls?url=https%3A%2F%2Fex.com%2Flow%2Findex.m3u8");
    }

    #[test]
    fn master_content_line_without_preceding_tag_untouched() {
        let input = "#EXT-X-STREAM-INF:BANDWIDTH=1\nv.m3u8\norphan.m3u8";
        let out = rewrite_playlist(input, "https://ex.com/master.m3u8", "", false);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].starts_with("/hls?url="));
        // Flag was cleared after the first reference; no tag re-armed it.
        assert_eq!(lines[2], "orphan.m3u8");
    }

    #[test]
    fn media_segment_and_key_rewritten() {
        let out = rewrite_playlist(MEDIA, "https://ex.com/live/index.m3u8", "", false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(
            lines[1],
            "#EXT-X-KEY:METHOD=AES-128,URI=\"/segment?url=https%3A%2F%2Fex.com%2Flive%2Fkey.bin\""
        );
        assert_eq!(lines[2], "#EXTINF:10.0,");
        assert_eq!(
            lines[3],
            "/segment?url=https%3A%2F%2Fex.com%2Flive%2Fseg1.ts"
        );
    }

    #[test]
    fn key_line_trailing_attributes_preserved() {
        let input = "#EXTINF:1.0,\n#EXT-X-KEY:METHOD=AES-128,URI=\"k.bin\",IV=0xABCDEF";
        let out = rewrite_playlist(input, "https://ex.com/live/p.m3u8", "", false);
        let key_line = out.lines().nth(1).unwrap();
        assert!(key_line.starts_with("#EXT-X-KEY:METHOD=AES-128,URI=\""));
        assert!(key_line.ends_with("\",IV=0xABCDEF"));
        assert!(key_line.contains("url=https%3A%2F%2Fex.com%2Flive%2Fk.bin"));
    }

    #[test]
    fn key_line_without_uri_emitted_verbatim() {
        let input = "#EXTINF:1.0,\n#EXT-X-KEY:METHOD=NONE";
        let out = rewrite_playlist(input, "https://ex.com/live/p.m3u8", "", false);
        assert_eq!(out.lines().nth(1).unwrap(), "#EXT-X-KEY:METHOD=NONE");
    }

    #[test]
    fn absolute_segment_url_still_routed_through_proxy() {
        let input = "#EXTINF:4.0,\nhttps://cdn.other.com/live/seg9.ts";
        let out = rewrite_playlist(input, "https://ex.com/live/p.m3u8", "", false);
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "/segment?url=https%3A%2F%2Fcdn.other.com%2Flive%2Fseg9.ts"
        );
    }

    #[test]
    fn all_segment_extensions_recognized() {
        for name in ["a.ts", "a.aac", "a.m4s", "a.mp4", "a.vtt"] {
            let input = format!("#EXTINF:1.0,\n{}", name);
            let out = rewrite_playlist(&input, "https://ex.com/live/p.m3u8", "", false);
            assert!(
                out.lines().nth(1).unwrap().starts_with("/segment?url="),
                "{} should be rewritten",
                name
            );
        }
    }

    #[test]
    fn segment_with_query_string_rewritten() {
        let input = "#EXTINF:1.0,\nseg1.ts?token=abc";
        let out = rewrite_playlist(input, "https://ex.com/live/p.m3u8", "", false);
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "/segment?url=https%3A%2F%2Fex.com%2Flive%2Fseg1.ts%3Ftoken%3Dabc"
        );
    }

    #[test]
    fn unrecognized_content_passes_through_byte_identical() {
        let input = "just some\nrandom text\nwith no markers\n";
        assert_eq!(
            rewrite_playlist(input, "https://ex.com/x", "", false),
            input
        );
    }

    #[test]
    fn line_count_preserved() {
        let inputs = [
            MASTER,
            MEDIA,
            "#EXTM3U\n\n#EXT-X-TARGETDURATION:10\n#EXTINF:10.0,\nseg.ts\n#EXT-X-ENDLIST",
        ];
        for input in inputs {
            let out = rewrite_playlist(input, "https://ex.com/live/p.m3u8", "", false);
            assert_eq!(out.lines().count(), input.lines().count());
        }
    }

    #[test]
    fn debug_banner_prepends_exactly_four_lines() {
        let plain = rewrite_playlist(MEDIA, "https://ex.com/live/p.m3u8", "", false);
        let banner = rewrite_playlist(MEDIA, "https://ex.com/live/p.m3u8", "", true);
        assert_eq!(banner.lines().count(), plain.lines().count() + 4);
        assert!(banner.starts_with("#EXTM3U\n"));
        assert!(banner.contains("## rewritten by streamgate"));
        assert!(banner.ends_with(&plain));
    }

    #[test]
    fn metadata_tags_never_touched() {
        let input = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-MEDIA-SEQUENCE:42\n#EXTINF:10.0,\nseg.ts";
        let out = rewrite_playlist(input, "https://ex.com/live/p.m3u8", "", false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "#EXT-X-VERSION:3");
        assert_eq!(lines[2], "#EXT-X-MEDIA-SEQUENCE:42");
    }
}
