//! Small helpers shared across the pipeline: the site's fixed timezone and
//! string truncation for log output.

use chrono::{DateTime, FixedOffset, Utc};

/// Korea Standard Time as a fixed offset.
///
/// AI Times publishes listing times in KST, which has no daylight saving, so
/// a fixed +09:00 offset is exact.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("KST offset is in range")
}

/// Current wall-clock time in KST.
///
/// All recency decisions for one invocation are made against a single `now`
/// captured at startup, so a slow crawl cannot shift the window mid-run.
pub fn now_kst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst())
}

/// Truncate a string for logging purposes.
///
/// Long response bodies are truncated to `max` bytes with an ellipsis and
/// byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kst_offset() {
        assert_eq!(kst().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // 기 is 3 bytes; cutting at byte 4 must back off to a char boundary.
        let s = "기사 본문 내용입니다";
        let result = truncate_for_log(s, 4);
        assert!(result.starts_with('기'));
    }
}
