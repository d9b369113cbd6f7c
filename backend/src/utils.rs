use time::OffsetDateTime;

/// `YYYY-MM-DD hh:mm:ss.fff` in UTC, the form shown to voters.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    format!(
        "{} {:02}:{:02}:{:02}.{:03}",
        utc.date(),
        utc.hour(),
        utc.minute(),
        utc.second(),
        utc.millisecond()
    )
}
