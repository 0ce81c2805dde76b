//! Display helpers for durations and constrained-width text.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a duration in seconds into a compact form (`45s`, `2m 5s`, `3h 12m`).
pub fn format_duration_secs(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86_400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3600)
    }
}

/// Truncate to `max_width` display columns, marking the cut with `…`.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width + 1 > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

/// Pluralize `unit` for `count` (`1 day`, `7 days`).
pub fn pluralize(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_duration_ranges() {
        assert_eq!(format_duration_secs(-4), "0s");
        assert_eq!(format_duration_secs(45), "45s");
        assert_eq!(format_duration_secs(125), "2m 5s");
        assert_eq!(format_duration_secs(3 * 3600 + 12 * 60), "3h 12m");
        assert_eq!(format_duration_secs(2 * 86_400 + 3600), "2d 1h");
    }

    #[test]
    fn truncates_by_display_width() {
        assert_eq!(truncate_with_ellipsis("workflow", 20), "workflow");
        assert_eq!(truncate_with_ellipsis("workflow", 5), "work…");
        assert_eq!(truncate_with_ellipsis("workflow", 0), "");
    }

    #[test]
    fn pluralizes_units() {
        assert_eq!(pluralize(1, "day"), "1 day");
        assert_eq!(pluralize(7, "day"), "7 days");
    }
}
