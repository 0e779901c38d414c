use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Format;
use crate::value;

#[derive(Parser, Debug)]
#[command(version, about = "offline registry hive tool (offreg.dll)")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub sub: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print the offreg.dll hive format version and the host OS version
    Version,
    /// Create an empty hive file
    New {
        /// Hive file to create (must not exist)
        path: PathBuf,
    },
    /// Print the keys and values of a hive
    Dump {
        path: PathBuf,

        /// Start at this key (`\`-separated) instead of the root
        #[arg(long, short = 'k')]
        key: Option<String>,

        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Levels below the starting key to descend
        #[arg(long)]
        max_depth: Option<usize>,

        /// Omit value payloads
        #[arg(long)]
        no_data: bool,
    },
    /// Write a value, creating the key path if needed; saves the hive in place
    Set {
        path: PathBuf,
        /// Key path (`\`-separated)
        key: String,
        /// Value name; empty for the default value
        name: String,
        #[command(flatten)]
        data: ValueSource,
    },
    /// Delete a value, or the key itself when no value is given; saves in place
    Delete {
        path: PathBuf,
        /// Key path (`\`-separated)
        key: String,
        /// Value to delete instead of the key
        #[arg(long)]
        value: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ValueSource {
    /// REG_SZ string
    #[arg(long)]
    pub sz: Option<String>,
    /// REG_EXPAND_SZ string
    #[arg(long)]
    pub expand_sz: Option<String>,
    /// REG_MULTI_SZ strings
    #[arg(long, num_args = 1..)]
    pub multi_sz: Option<Vec<String>>,
    /// REG_DWORD number
    #[arg(long)]
    pub dword: Option<u32>,
    /// REG_QWORD number
    #[arg(long)]
    pub qword: Option<u64>,
    /// REG_BINARY bytes as hex
    #[arg(long)]
    pub binary: Option<String>,
}

impl ValueSource {
    /// Value type tag and encoded payload.
    pub fn encode(&self) -> Result<(u32, Vec<u8>)> {
        if let Some(s) = &self.sz {
            return Ok((offreg::REG_SZ, value::encode_string(s)));
        }
        if let Some(s) = &self.expand_sz {
            return Ok((offreg::REG_EXPAND_SZ, value::encode_string(s)));
        }
        if let Some(items) = &self.multi_sz {
            return Ok((offreg::REG_MULTI_SZ, value::encode_multi_string(items)?));
        }
        if let Some(n) = self.dword {
            return Ok(value::encode_dword(n));
        }
        if let Some(n) = self.qword {
            return Ok(value::encode_qword(n));
        }
        if let Some(hex_str) = &self.binary {
            return Ok(value::binary(value::encode_binary(hex_str)?));
        }
        anyhow::bail!("no value given")
    }
}
