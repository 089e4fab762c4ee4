use crate::Segment;

/// Render segments as plain text, joined by single spaces
pub fn render_text(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Render segments one per line, each prefixed with `[m:ss]`
pub fn render_timestamped(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{}] {}", format_timestamp(s.start), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pick the rendering for the `timestamps` flag
pub fn render(segments: &[Segment], timestamps: bool) -> String {
    if timestamps {
        render_timestamped(segments)
    } else {
        render_text(segments)
    }
}

// Truncates, never rounds: 59.9s is still 0:59.
fn format_timestamp(start: f64) -> String {
    let mins = (start / 60.0).floor() as u64;
    let secs = start.rem_euclid(60.0).floor() as u64;
    format!("{mins}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, text: &str) -> Segment {
        Segment {
            text: text.to_string(),
            start,
            duration: 1.0,
        }
    }

    fn sample_segments() -> Vec<Segment> {
        vec![segment(5.0, "hello"), segment(65.0, "world")]
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render_text(&sample_segments()), "hello world");
    }

    #[test]
    fn test_render_timestamped() {
        assert_eq!(render_timestamped(&sample_segments()), "[0:05] hello\n[1:05] world");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[], true), "");
        assert_eq!(render(&[], false), "");
    }

    #[test]
    fn test_render_dispatch() {
        let segments = sample_segments();
        assert_eq!(render(&segments, false), render_text(&segments));
        assert_eq!(render(&segments, true), render_timestamped(&segments));
    }

    #[test]
    fn test_timestamp_truncates() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(59.99), "0:59");
        assert_eq!(format_timestamp(60.0), "1:00");
        assert_eq!(format_timestamp(119.5), "1:59");
        assert_eq!(format_timestamp(3723.4), "62:03");
    }

    #[test]
    fn test_render_preserves_order() {
        let segments = vec![segment(30.0, "b"), segment(10.0, "a")];
        assert_eq!(render_text(&segments), "b a");
        assert_eq!(render_timestamped(&segments), "[0:30] b\n[0:10] a");
    }
}
