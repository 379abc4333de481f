//! 通用工具函数

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// 解析服务端返回的时间戳
///
/// 接受 `YYYY-MM-DD`（按当天零点处理）、`YYYY-MM-DDTHH:MM[:SS[.f]]`、
/// 空格分隔的同样格式以及 RFC 3339（取其本地时间部分）。
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 解析 `YYYY-MM-DD` 日期，忽略空字符串
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// 计算到指定日期为止的整岁年龄（考虑当年生日是否已过）
pub fn age_on(birth_date: NaiveDate, on: NaiveDate) -> Option<u32> {
    if on < birth_date {
        return None;
    }
    let mut years = on.year() - birth_date.year();
    if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// 把空白字符串视为缺失
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
