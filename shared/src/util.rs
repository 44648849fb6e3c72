/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Today's calendar date in the server's local time zone.
///
/// Station sequences restart every local day, so this is the value stored
/// in `ticket.station_day`.
pub fn local_today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
