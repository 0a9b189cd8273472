use crate::error::{ServiceError, ServiceResult};
use anyhow::Context;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FALLBACK_NAME: &str = "upload";

pub fn ensure_upload_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create upload directory {}", dir.to_string_lossy()))
}

/// Last path component of a client-supplied filename, never empty.
fn sanitize_filename(raw: Option<&str>) -> String {
    let base = raw
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        FALLBACK_NAME.to_string()
    } else {
        base.to_string()
    }
}

/// Stores `bytes` as `<dir>/<file_id>_<filename>` and returns the new file id.
pub fn store_upload(dir: &Path, original_name: Option<&str>, bytes: &[u8]) -> ServiceResult<String> {
    std::fs::create_dir_all(dir)?;
    let file_id = Uuid::new_v4().to_string();
    let path = dir.join(format!("{}_{}", file_id, sanitize_filename(original_name)));
    std::fs::write(&path, bytes)?;
    tracing::info!(file_id = %file_id, path = %path.to_string_lossy(), size = bytes.len(), "stored upload");
    Ok(file_id)
}

pub fn resolve_upload(dir: &Path, file_id: &str) -> ServiceResult<PathBuf> {
    let file_id = file_id.trim();
    if file_id.is_empty() || file_id.contains(['/', '\\', '.']) {
        return Err(ServiceError::validation("file_id is malformed"));
    }
    let prefix = format!("{}_", file_id);

    let entries = match std::fs::read_dir(dir) {
        Ok(v) => v,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::not_found("File not found"));
        }
        Err(e) => return Err(e.into()),
    };

    let mut best: Option<PathBuf> = None;
    for ent in entries {
        let p = ent?.path();
        if !p.is_file() {
            continue;
        }
        let Some(name) = p.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if name.starts_with(&prefix) {
            // Deterministic pick if multiple exist.
            if best.as_ref().map(|b| p < *b).unwrap_or(true) {
                best = Some(p);
            }
        }
    }
    best.ok_or_else(|| ServiceError::not_found("File not found"))
}
