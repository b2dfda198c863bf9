//! Reading and rewriting Internet Shortcut (`.url`) files.
//!
//! The format is a small INI-style text file. Only the `URL` and
//! `IconFile` fields matter here; every other byte is preserved untouched
//! on rewrite, including the file's original line endings.

use crate::ShortcutError;

/// Launch scheme marking a shortcut as client-owned.
pub const RUN_GAME_PREFIX: &str = "steam://rungameid/";

/// Extracts the app id from a shortcut's `URL` field.
///
/// Returns `Ok(None)` for shortcuts that do not target the client's
/// run-by-id scheme (not ours, skipped), and
/// [`ShortcutError::MalformedRunId`] when the scheme is present but the id
/// is not numeric.
pub fn run_game_id(content: &str) -> Result<Option<String>, ShortcutError> {
    for line in content.lines() {
        let Some(url) = line.trim().strip_prefix("URL=") else {
            continue;
        };
        let Some(id) = url.trim().strip_prefix(RUN_GAME_PREFIX) else {
            return Ok(None);
        };
        let id = id.trim_end_matches('/');
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ShortcutError::MalformedRunId(id.to_string()));
        }
        return Ok(Some(id.to_string()));
    }
    Ok(None)
}

/// Returns the current `IconFile` value, if any.
pub fn icon_file(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("IconFile="))
        .map(str::trim)
}

/// Returns the content with the `IconFile` field set to `icon_path`.
///
/// Rewrites only that line, keeping its original terminator; a shortcut
/// without an `IconFile` field gets one appended. All other fields pass
/// through byte for byte.
pub fn with_icon_file(content: &str, icon_path: &str) -> String {
    let mut out = String::with_capacity(content.len() + icon_path.len() + 16);
    let mut replaced = false;

    for segment in content.split_inclusive('\n') {
        let (line, terminator) = split_line_terminator(segment);
        if !replaced && line.trim().starts_with("IconFile=") {
            out.push_str("IconFile=");
            out.push_str(icon_path);
            out.push_str(terminator);
            replaced = true;
        } else {
            out.push_str(segment);
        }
    }

    if !replaced {
        let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
        if !out.is_empty() && !out.ends_with('\n') {
            out.push_str(eol);
        }
        out.push_str("IconFile=");
        out.push_str(icon_path);
        out.push_str(eol);
    }

    out
}

fn split_line_terminator(segment: &str) -> (&str, &str) {
    if let Some(line) = segment.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = segment.strip_suffix('\n') {
        (line, "\n")
    } else {
        (segment, "")
    }
}
