use crate::error::{Xls2JsonError, Xls2JsonResult};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Serialize the output collection as a JSON array
pub fn to_json<T: Serialize>(data: &[T], pretty: bool) -> Xls2JsonResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    Ok(json)
}

/// Write serialized output to `path`, or stdout when no path is given.
///
/// Files are written to a temporary sibling and renamed into place, so an
/// existing file is never left half-written.
pub fn write_output(json: &str, path: Option<&Path>) -> Xls2JsonResult<()> {
    match path {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut file = NamedTempFile::new_in(dir)?;
            file.write_all(json.as_bytes())?;
            file.flush()?;
            file.persist(path).map_err(|e| Xls2JsonError::Io(e.error))?;
            info!(path = %path.display(), bytes = json.len(), "wrote output");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}")?;
            handle.flush()?;
        }
    }
    Ok(())
}
