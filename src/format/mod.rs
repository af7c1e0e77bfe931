//! Line formatter
//!
//! Converts one raw event into a display line: either the raw message,
//! or a normalized `ts=<bracketed-timestamp> <tab-joined-kv-tail>` form.
//! This is a best-effort structured rendering, not a strict parser:
//! messages without `=` tokens or brackets degrade to printing the whole
//! message as the kv tail with an empty timestamp field.

use crate::api::Event;

/// Format one event for display.
///
/// With `kv` false the raw message is returned unmodified. With `kv`
/// true the message is split on single spaces; output is
/// `ts=<first-bracketed-span-or-empty> ` followed by the tokens from the
/// first `=`-bearing token onward (or all tokens when none contains
/// `=`), joined with tabs.
pub fn format_event(event: &Event, kv: bool) -> String {
    if !kv {
        return event.message.clone();
    }

    let parts: Vec<&str> = event.message.split(' ').collect();
    let start = parts.iter().position(|p| p.contains('=')).unwrap_or(0);

    let ts = first_bracketed(&event.message).unwrap_or("");

    format!("ts={} {}", ts, parts[start..].join("\t"))
}

/// Find the first bracketed `[...]` span in `s`, brackets included.
///
/// Plain substring scan with non-greedy semantics: the span runs from
/// the first `[` to the first `]` after it. Nested brackets are not
/// balanced; later pairs on the same line are ignored.
fn first_bracketed(s: &str) -> Option<&str> {
    let open = s.find('[')?;
    let close = s[open + 1..].find(']')?;
    Some(&s[open..=open + 1 + close])
}
