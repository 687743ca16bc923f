use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// The board records wall-clock times in Japan Standard Time.
const JST_OFFSET_SECS: i32 = 9 * 3600;

fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Current time as an RFC 3339 string in UTC+9, second precision.
/// Stored as TEXT; lexicographic order matches chronological order.
pub fn jst_timestamp() -> String {
    format_jst(Utc::now())
}

pub fn format_jst(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&jst())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}
