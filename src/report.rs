//! Recursive hive dumps in text or JSON form.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, Utc};
use offreg::{FileTime, KeyLike};
use serde::Serialize;

use crate::config::DumpConfig;
use crate::hive;
use crate::value::{self, ValueData};

/// Seconds between the FILETIME epoch (1601-01-01) and the Unix epoch.
const EPOCH_DIFFERENCE_SECS: i64 = 11_644_473_600;
const TICKS_PER_SEC: u64 = 10_000_000;

/// Convert a `FILETIME` to UTC; zero means "never written".
pub fn filetime_to_utc(ft: FileTime) -> Option<DateTime<Utc>> {
    let ticks = (u64::from(ft.high_date_time) << 32) | u64::from(ft.low_date_time);
    if ticks == 0 {
        return None;
    }
    let secs = (ticks / TICKS_PER_SEC) as i64 - EPOCH_DIFFERENCE_SECS;
    let nanos = ((ticks % TICKS_PER_SEC) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueReport {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyReport {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class: String,
    pub last_write: Option<DateTime<Utc>>,
    pub values: Vec<ValueReport>,
    pub sub_keys: Vec<KeyReport>,
    /// Set when `max_depth` stopped the walk below this key.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

fn value_reports(key: impl KeyLike, cfg: &DumpConfig) -> Result<Vec<ValueReport>> {
    Ok(hive::values(key)?
        .into_iter()
        .map(|raw| ValueReport {
            value_type: value::type_name(raw.value_type),
            size: raw.data.len(),
            value: cfg
                .show_data
                .then(|| value::decode(raw.value_type, &raw.data)),
            name: raw.name,
        })
        .collect())
}

/// Walk `key` and everything below it.
pub fn collect(key: impl KeyLike, name: &str, cfg: &DumpConfig) -> Result<KeyReport> {
    let info = hive::query_info(key)?;
    let mut report = KeyReport {
        name: name.to_string(),
        class: info.class,
        last_write: filetime_to_utc(info.last_write_time),
        values: value_reports(key, cfg)?,
        sub_keys: Vec::new(),
        truncated: false,
    };
    walk(key, &mut report, cfg, 0)?;
    Ok(report)
}

fn walk(key: impl KeyLike, report: &mut KeyReport, cfg: &DumpConfig, depth: usize) -> Result<()> {
    let children = hive::sub_keys(key)?;
    if children.is_empty() {
        return Ok(());
    }
    if cfg.max_depth.is_some_and(|max| depth >= max) {
        report.truncated = true;
        return Ok(());
    }

    for child in children {
        let opened = hive::open_key(key, &child.name)?;
        let mut sub = KeyReport {
            values: value_reports(opened.handle(), cfg)?,
            name: child.name,
            class: child.class,
            last_write: filetime_to_utc(child.last_write_time),
            sub_keys: Vec::new(),
            truncated: false,
        };
        walk(opened.handle(), &mut sub, cfg, depth + 1)?;
        report.sub_keys.push(sub);
    }
    Ok(())
}

fn render_value(data: &ValueData) -> String {
    match data {
        ValueData::String(s) => format!("{s:?}"),
        ValueData::MultiString(items) => format!("{items:?}"),
        ValueData::Dword(n) => format!("{n:#010x} ({n})"),
        ValueData::Qword(n) => format!("{n:#018x} ({n})"),
        ValueData::Binary(hex) if hex.is_empty() => "(empty)".to_string(),
        ValueData::Binary(hex) => hex.clone(),
    }
}

/// Indented tree, one line per key and value.
pub fn render_text(report: &KeyReport) -> String {
    let mut out = String::new();
    render_key(report, 0, &mut out);
    out
}

fn render_key(report: &KeyReport, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let name = if report.name.is_empty() { "\\" } else { report.name.as_str() };
    let _ = write!(out, "{indent}[{name}]");
    if !report.class.is_empty() {
        let _ = write!(out, " class={}", report.class);
    }
    if let Some(ts) = report.last_write {
        let _ = write!(out, " {}", ts.to_rfc3339());
    }
    if report.truncated {
        out.push_str(" ...");
    }
    out.push('\n');

    for v in &report.values {
        let name = if v.name.is_empty() { "(default)" } else { v.name.as_str() };
        let _ = write!(out, "{indent}  {name} {} [{} bytes]", v.value_type, v.size);
        if let Some(data) = &v.value {
            let _ = write!(out, " = {}", render_value(data));
        }
        out.push('\n');
    }
    for sub in &report.sub_keys {
        render_key(sub, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> KeyReport {
        KeyReport {
            name: String::new(),
            class: String::new(),
            last_write: None,
            values: vec![],
            sub_keys: vec![KeyReport {
                name: "A".into(),
                class: String::new(),
                last_write: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single(),
                values: vec![
                    ValueReport {
                        name: "name".into(),
                        value_type: "REG_SZ".into(),
                        size: 12,
                        value: Some(ValueData::String("hello".into())),
                    },
                    ValueReport {
                        name: String::new(),
                        value_type: "REG_DWORD".into(),
                        size: 4,
                        value: None,
                    },
                ],
                sub_keys: vec![],
                truncated: true,
            }],
            truncated: false,
        }
    }

    #[test]
    fn test_filetime_conversion() {
        assert_eq!(filetime_to_utc(FileTime::default()), None);

        // 2024-01-02T03:04:05Z
        let ticks: u64 = (1_704_164_645 + 11_644_473_600) * 10_000_000 + 7;
        let ft = FileTime {
            low_date_time: ticks as u32,
            high_date_time: (ticks >> 32) as u32,
        };
        let ts = filetime_to_utc(ft).unwrap();
        assert_eq!(ts.timestamp(), 1_704_164_645);
        assert_eq!(ts.timestamp_subsec_nanos(), 700);
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[\\]");
        assert_eq!(lines[1], "  [A] 2024-01-02T03:04:05+00:00 ...");
        assert_eq!(lines[2], "    name REG_SZ [12 bytes] = \"hello\"");
        assert_eq!(lines[3], "    (default) REG_DWORD [4 bytes]");
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        let child = &json["sub_keys"][0];
        assert_eq!(child["name"], "A");
        assert_eq!(child["truncated"], true);
        assert!(child.get("class").is_none());
        assert!(json.get("truncated").is_none());
        assert_eq!(child["values"][0]["type"], "REG_SZ");
        assert_eq!(child["values"][0]["value"]["data"], "hello");
        assert!(child["values"][1].get("value").is_none());
    }

    #[test]
    fn test_render_integers() {
        assert_eq!(render_value(&ValueData::Dword(1)), "0x00000001 (1)");
        assert_eq!(render_value(&ValueData::Binary(String::new())), "(empty)");
    }
}
