mod cli;
mod config;
mod hive;
mod report;
mod value;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use config::{Format, ToolConfig};
use hive::Hive;

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = real_main() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let args = cli::Args::parse();
    let cfg = ToolConfig::load(args.config.as_deref())?;

    offreg::find_all().context("offreg.dll is not usable on this host")?;

    match args.sub {
        cli::Cmd::Version => handle_version(),
        cli::Cmd::New { path } => handle_new(&cfg, &path),
        cli::Cmd::Dump {
            path,
            key,
            format,
            max_depth,
            no_data,
        } => {
            let mut dump = cfg.dump.clone();
            if let Some(format) = format {
                dump.format = format;
            }
            if max_depth.is_some() {
                dump.max_depth = max_depth;
            }
            if no_data {
                dump.show_data = false;
            }
            handle_dump(&path, key.as_deref(), &dump)
        }
        cli::Cmd::Set {
            path,
            key,
            name,
            data,
        } => {
            let (value_type, bytes) = data.encode()?;
            handle_set(&cfg, &path, &key, &name, value_type, &bytes)
        }
        cli::Cmd::Delete { path, key, value } => handle_delete(&cfg, &path, &key, value.as_deref()),
    }
}

/// Version stamp for saved hives: configured, else the host OS version.
fn stamp(cfg: &ToolConfig) -> Result<(u32, u32)> {
    if let Some(stamp) = cfg.stamp {
        return Ok((stamp.major, stamp.minor));
    }

    #[cfg(windows)]
    {
        Ok(offreg::os_version())
    }

    #[cfg(not(windows))]
    {
        anyhow::bail!("No [stamp] configured and the host OS version is unavailable")
    }
}

fn handle_version() -> Result<()> {
    let (mut major, mut minor) = (0u32, 0u32);
    unsafe { offreg::ORGetVersion(&mut major, &mut minor) };
    println!("offreg.dll hive format: {major}.{minor}");

    #[cfg(windows)]
    {
        let (os_major, os_minor) = offreg::os_version();
        println!("host OS version: {os_major}.{os_minor}");
    }
    Ok(())
}

fn handle_new(cfg: &ToolConfig, path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let stamp = stamp(cfg)?;
    let hive = Hive::create()?;
    hive.save(path, stamp)?;
    println!("created {} (stamp {}.{})", path.display(), stamp.0, stamp.1);
    Ok(())
}

fn handle_dump(path: &Path, key: Option<&str>, dump: &config::DumpConfig) -> Result<()> {
    let hive = Hive::open(path)?;

    let key_path = key.unwrap_or("");
    let start = hive::open_key(hive.root(), key_path)?;
    let report = report::collect(start.handle(), key_path, dump)?;

    match dump.format {
        Format::Text => print!("{}", report::render_text(&report)),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize dump")?
        ),
    }
    Ok(())
}

fn handle_set(
    cfg: &ToolConfig,
    path: &Path,
    key_path: &str,
    name: &str,
    value_type: u32,
    bytes: &[u8],
) -> Result<()> {
    let stamp = stamp(cfg)?;
    let hive = Hive::open(path)?;
    {
        let key = hive::create_key_path(hive.root(), key_path)?;
        hive::set_value(key.handle(), name, value_type, bytes)?;
    }
    hive.save_in_place(path, stamp)?;
    info!(
        "Set {key_path}\\{name} ({}, {} bytes) in {}",
        value::type_name(value_type),
        bytes.len(),
        path.display()
    );
    Ok(())
}

fn handle_delete(cfg: &ToolConfig, path: &Path, key_path: &str, value: Option<&str>) -> Result<()> {
    let stamp = stamp(cfg)?;
    let hive = Hive::open(path)?;
    match value {
        Some(name) => {
            let key = hive::open_key(hive.root(), key_path)?;
            hive::delete_value(key.handle(), name)?;
            info!("Deleted value {key_path}\\{name}");
        }
        None => {
            let mut parts: Vec<&str> = hive::segments(key_path).collect();
            let leaf = parts
                .pop()
                .with_context(|| format!("Refusing to delete the hive root ('{key_path}')"))?;
            if parts.is_empty() {
                hive::delete_key(hive.root(), leaf)?;
            } else {
                let parent = hive::open_key(hive.root(), &parts.join("\\"))?;
                hive::delete_key(parent.handle(), leaf)?;
            }
            info!("Deleted key {key_path}");
        }
    }
    hive.save_in_place(path, stamp)?;
    Ok(())
}
