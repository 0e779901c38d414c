//! Encoding and decoding of registry value payloads.

use anyhow::{Context, Result, bail};
use offreg::{
    REG_BINARY, REG_DWORD, REG_DWORD_BIG_ENDIAN, REG_EXPAND_SZ, REG_LINK, REG_MULTI_SZ, REG_QWORD,
    REG_SZ, RegType,
};
use serde::Serialize;

/// Decoded value payload, as shown by `dump`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ValueData {
    String(String),
    MultiString(Vec<String>),
    Dword(u32),
    Qword(u64),
    Binary(String),
}

/// Display name for a value type tag.
pub fn type_name(tag: u32) -> String {
    match RegType::try_from(tag) {
        Ok(ty) => ty.name().to_string(),
        Err(tag) => format!("0x{tag:x}"),
    }
}

fn utf16_units(bytes: &[u8]) -> Option<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect(),
    )
}

/// Interpret raw bytes according to their type tag.
///
/// Malformed payloads (odd-length strings, short integers) fall back to hex.
pub fn decode(tag: u32, bytes: &[u8]) -> ValueData {
    let fallback = || ValueData::Binary(hex::encode(bytes));

    match tag {
        REG_SZ | REG_EXPAND_SZ | REG_LINK => match utf16_units(bytes) {
            Some(units) => {
                let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
                ValueData::String(String::from_utf16_lossy(&units[..end]))
            }
            None => fallback(),
        },
        REG_MULTI_SZ => match utf16_units(bytes) {
            Some(units) => {
                let mut strings: Vec<String> = units
                    .split(|&u| u == 0)
                    .map(String::from_utf16_lossy)
                    .collect();
                while strings.last().is_some_and(|s| s.is_empty()) {
                    strings.pop();
                }
                ValueData::MultiString(strings)
            }
            None => fallback(),
        },
        REG_DWORD => match <[u8; 4]>::try_from(bytes) {
            Ok(raw) => ValueData::Dword(u32::from_le_bytes(raw)),
            Err(_) => fallback(),
        },
        REG_DWORD_BIG_ENDIAN => match <[u8; 4]>::try_from(bytes) {
            Ok(raw) => ValueData::Dword(u32::from_be_bytes(raw)),
            Err(_) => fallback(),
        },
        REG_QWORD => match <[u8; 8]>::try_from(bytes) {
            Ok(raw) => ValueData::Qword(u64::from_le_bytes(raw)),
            Err(_) => fallback(),
        },
        _ => fallback(),
    }
}

fn wide_bytes(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(Some(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// `REG_SZ` / `REG_EXPAND_SZ` payload, including the terminating null.
pub fn encode_string(s: &str) -> Vec<u8> {
    wide_bytes(s)
}

/// `REG_MULTI_SZ` payload: each string null-terminated, then a final null.
pub fn encode_multi_string<S: AsRef<str>>(strings: &[S]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for s in strings {
        let s = s.as_ref();
        if s.is_empty() {
            bail!("REG_MULTI_SZ entries cannot be empty");
        }
        bytes.extend(wide_bytes(s));
    }
    bytes.extend([0, 0]);
    Ok(bytes)
}

/// `REG_BINARY` payload from a hex string (whitespace ignored).
pub fn encode_binary(hex_str: &str) -> Result<Vec<u8>> {
    let compact: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).with_context(|| format!("invalid hex payload '{hex_str}'"))
}

pub fn encode_dword(value: u32) -> (u32, Vec<u8>) {
    (REG_DWORD, value.to_le_bytes().to_vec())
}

pub fn encode_qword(value: u64) -> (u32, Vec<u8>) {
    (REG_QWORD, value.to_le_bytes().to_vec())
}

pub fn binary(bytes: Vec<u8>) -> (u32, Vec<u8>) {
    (REG_BINARY, bytes)
}
