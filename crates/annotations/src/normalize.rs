//! Whitespace normalization and word counting
//!
//! Annotation snippets and document text are normalized with the same
//! function before any comparison. Containment matching is only meaningful
//! because both sides go through this exact canonicalization.

/// Collapse every run of whitespace (spaces, tabs, newlines) to a single
/// space and trim leading/trailing whitespace. Pure and idempotent.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space && !out.is_empty() {
                out.push(' ');
                prev_was_space = true;
            }
        } else {
            out.push(ch);
            prev_was_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Count whitespace-delimited non-empty tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Normalize while recording, for every byte of the normalized output, the
/// byte offset in the raw input it came from. Collapsed whitespace maps to
/// the offset of the first whitespace character in its run. Lets callers
/// report match offsets relative to the raw text of a node.
pub(crate) fn normalize_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len());
    let mut pending_space: Option<usize> = None;
    for (raw_idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if pending_space.is_none() && !out.is_empty() {
                pending_space = Some(raw_idx);
            }
        } else {
            if let Some(space_idx) = pending_space.take() {
                out.push(' ');
                map.push(space_idx);
            }
            let start = out.len();
            out.push(ch);
            for _ in start..out.len() {
                map.push(raw_idx);
            }
        }
    }
    // A trailing pending space is dropped, which is what trims the end
    (out, map)
}

/// Like [`normalize_with_offsets`] but without trimming: leading and
/// trailing whitespace runs each collapse to a single space instead of
/// disappearing. Used when leaf texts are concatenated for cross-node
/// search, where an edge space is the only thing separating two leaves.
pub(crate) fn collapse_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len());
    let mut pending_space: Option<usize> = None;
    for (raw_idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if pending_space.is_none() {
                pending_space = Some(raw_idx);
            }
        } else {
            if let Some(space_idx) = pending_space.take() {
                out.push(' ');
                map.push(space_idx);
            }
            let start = out.len();
            out.push(ch);
            for _ in start..out.len() {
                map.push(raw_idx);
            }
        }
    }
    if let Some(space_idx) = pending_space {
        out.push(' ');
        map.push(space_idx);
    }
    (out, map)
}
