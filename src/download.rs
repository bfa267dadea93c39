//! CSV export saves.
//!
//! The backend streams ready-made CSV; this module only names the file and
//! writes the bytes into the download directory. Bytes are dropped as soon
//! as the write returns.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{log, obj, v_num, v_str, Domain, Level};

pub fn prediction_filename(id: &str) -> String {
    format!("prediction_{}.csv", id)
}

/// `all_predictions_<ts>.csv`, second resolution, colon-free for portability.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("all_predictions_{}.csv", now.format("%Y-%m-%dT%H-%M-%S"))
}

pub fn save(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    log(
        Level::Info,
        Domain::Download,
        "saved",
        obj(&[
            ("path", v_str(&path.to_string_lossy())),
            ("bytes", v_num(bytes.len() as f64)),
        ]),
    );
    Ok(path)
}
