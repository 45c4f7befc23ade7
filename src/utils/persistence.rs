use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{errors::EngineResult, ledger::Ledger};

const TMP_SUFFIX: &str = "tmp";

/// Writes the provided ledger to disk atomically by staging to a temporary file.
pub fn save_ledger_to_file(ledger: &Ledger, path: &Path) -> EngineResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let json = serde_json::to_string_pretty(ledger)?;
    let mut file = File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Loads a ledger snapshot from disk, returning structured errors on failure.
pub fn load_ledger_from_file(path: &Path) -> EngineResult<Ledger> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
