//! Shared utility functions.

/// Shorten `s` for log output to at most `max_bytes` bytes plus an ellipsis,
/// cutting on a UTF-8 character boundary. Newlines are shown escaped so a
/// preview always stays on one log line.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let cut = if s.len() <= max_bytes {
        s
    } else {
        let mut end = max_bytes;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    };

    let mut out = cut.replace('\n', "\\n");
    if cut.len() < s.len() {
        out.push('…');
    }
    out
}
