//! Scroll restoration for anchor links.
//!
//! Client-side navigation does not scroll to `#fragment` targets on its own.
//! Two hooks fix that:
//!
//! - **initial render**: after the first paint, scroll the window to the
//!   element named by the URL fragment, if there is one;
//! - **route change**: answer the router with `[0, y]` for a resolvable
//!   fragment, or `true` to let it restore scroll the default way.
//!
//! The browser implementation is [`SCROLL_RESTORE_SCRIPT`], written out by
//! `asciidoc-pages scroll-script`. The functions here model the same logic
//! over two small traits so it can be tested without a browser.

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::sync::LazyLock;

/// The browser hooks, ready to ship with the site.
pub const SCROLL_RESTORE_SCRIPT: &str = include_str!("../static/scroll-restore.js");

/// File name the script is written under in the output directory.
pub const SCROLL_SCRIPT_FILENAME: &str = "scroll-restore.js";

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%([0-9A-Fa-f]{2})?").unwrap());

/// Characters `decodeURI` leaves escaped.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#";

/// Element lookup by id (the DOM).
pub trait AnchorLookup {
    /// Top offset of the element with this id, if it exists.
    fn offset_top(&self, id: &str) -> Option<i64>;
}

/// The browser window.
pub trait Viewport {
    /// Current `location.hash`, including the `#`.
    fn location_hash(&self) -> String;

    /// Block until the next animation frame.
    fn wait_for_frame(&mut self);

    fn scroll_to(&mut self, x: i64, y: i64);
}

/// Answer to the router's "should I update scroll?" question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Scroll to this position. Serializes as `[x, y]`.
    Position(i64, i64),
    /// Use the router's default handling. Serializes as `true`.
    Default,
}

impl Serialize for ScrollDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScrollDecision::Position(x, y) => [x, y].serialize(serializer),
            ScrollDecision::Default => serializer.serialize_bool(true),
        }
    }
}

/// Decode a URI the way the browser's `decodeURI` does.
///
/// Escapes of reserved characters (`%23`, `%2F`, ...) stay as written.
/// A `%` without two hex digits after it, or escapes that don't form
/// UTF-8, give `None` where the browser throws `URIError`.
pub fn decode_uri(text: &str) -> Option<String> {
    let mut malformed = false;
    let guarded = ESCAPE.replace_all(text, |caps: &Captures| {
        let Some(hex) = caps.get(1) else {
            malformed = true;
            return String::new();
        };
        match u8::from_str_radix(hex.as_str(), 16) {
            Ok(byte) if URI_RESERVED.contains(&byte) => format!("%25{}", hex.as_str()),
            _ => caps[0].to_string(),
        }
    });
    if malformed {
        return None;
    }
    percent_decode_str(&guarded)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

/// Offset of the element a URL fragment points at.
///
/// The first `#` is removed and the rest goes through [`decode_uri`], so
/// `#caf%C3%A9` looks up `café`. An empty or undecodable fragment never
/// matches.
pub fn target_offset(hash: &str, dom: &impl AnchorLookup) -> Option<i64> {
    let id = decode_uri(&hash.replacen('#', "", 1))?;
    if id.is_empty() {
        return None;
    }
    dom.offset_top(&id)
}

/// Initial render hook: scroll to the fragment target after the next frame.
pub fn on_initial_client_render(window: &mut impl Viewport, dom: &impl AnchorLookup) {
    window.wait_for_frame();
    if let Some(offset) = target_offset(&window.location_hash(), dom) {
        window.scroll_to(0, offset);
    }
}

/// Route change hook for a navigation to a location with this hash.
pub fn should_update_scroll(location_hash: &str, dom: &impl AnchorLookup) -> ScrollDecision {
    match target_offset(location_hash, dom) {
        Some(offset) => ScrollDecision::Position(0, offset),
        None => ScrollDecision::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Page {
        anchors: HashMap<String, i64>,
    }

    impl Page {
        fn with(anchors: &[(&str, i64)]) -> Self {
            Self {
                anchors: anchors.iter().map(|(id, y)| (id.to_string(), *y)).collect(),
            }
        }
    }

    impl AnchorLookup for Page {
        fn offset_top(&self, id: &str) -> Option<i64> {
            self.anchors.get(id).copied()
        }
    }

    /// Window that records what it was asked to do.
    struct Window {
        hash: String,
        events: Vec<String>,
    }

    impl Viewport for Window {
        fn location_hash(&self) -> String {
            self.hash.clone()
        }

        fn wait_for_frame(&mut self) {
            self.events.push("frame".into());
        }

        fn scroll_to(&mut self, x: i64, y: i64) {
            self.events.push(format!("scroll {x},{y}"));
        }
    }

    fn window(hash: &str) -> Window {
        Window {
            hash: hash.into(),
            events: vec![],
        }
    }

    // =========================================================================
    // Route changes
    // =========================================================================

    #[test]
    fn resolvable_fragment_scrolls_to_element() {
        let page = Page::with(&[("section-2", 400)]);
        assert_eq!(
            should_update_scroll("#section-2", &page),
            ScrollDecision::Position(0, 400)
        );
    }

    #[test]
    fn missing_fragment_defers_to_default() {
        let page = Page::with(&[("section-2", 400)]);
        assert_eq!(should_update_scroll("#missing", &page), ScrollDecision::Default);
        assert_eq!(should_update_scroll("", &page), ScrollDecision::Default);
        assert_eq!(should_update_scroll("#", &page), ScrollDecision::Default);
    }

    #[test]
    fn fragment_is_uri_decoded() {
        let page = Page::with(&[("café", 12), ("a b", 30)]);
        assert_eq!(target_offset("#caf%C3%A9", &page), Some(12));
        assert_eq!(target_offset("#a%20b", &page), Some(30));
    }

    #[test]
    fn reserved_escapes_stay_encoded() {
        assert_eq!(decode_uri("a%23b%2Fc%2fd").as_deref(), Some("a%23b%2Fc%2fd"));
        assert_eq!(decode_uri("x%3Fy%20z").as_deref(), Some("x%3Fy z"));
        let page = Page::with(&[("a%23b", 5), ("a#b", 9)]);
        assert_eq!(target_offset("#a%23b", &page), Some(5));
    }

    #[test]
    fn malformed_escapes_match_nothing() {
        assert_eq!(decode_uri("100%"), None);
        assert_eq!(decode_uri("%zz"), None);
        assert_eq!(decode_uri("%C3"), None);
        let page = Page::with(&[("100%", 1)]);
        assert_eq!(should_update_scroll("#100%", &page), ScrollDecision::Default);
    }

    #[test]
    fn decisions_serialize_like_the_browser_values() {
        assert_eq!(
            serde_json::to_string(&ScrollDecision::Position(0, 400)).unwrap(),
            "[0,400]"
        );
        assert_eq!(serde_json::to_string(&ScrollDecision::Default).unwrap(), "true");
    }

    // =========================================================================
    // Initial render
    // =========================================================================

    #[test]
    fn initial_render_scrolls_after_frame() {
        let page = Page::with(&[("_install", 250)]);
        let mut win = window("#_install");
        on_initial_client_render(&mut win, &page);
        assert_eq!(win.events, vec!["frame", "scroll 0,250"]);
    }

    #[test]
    fn initial_render_without_target_does_nothing() {
        let page = Page::with(&[]);
        let mut win = window("#nowhere");
        on_initial_client_render(&mut win, &page);
        assert_eq!(win.events, vec!["frame"]);
    }

    #[test]
    fn script_exports_both_hooks() {
        assert!(SCROLL_RESTORE_SCRIPT.contains("onInitialClientRender"));
        assert!(SCROLL_RESTORE_SCRIPT.contains("shouldUpdateScroll"));
    }
}
