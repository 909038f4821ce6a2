use crate::error::{TrackError, TrackResult};
use std::path::{Component, Path};

/// Renders a path relative to a walk root with `/` separators.
///
/// Host separators never leak into a manifest, so the same tree produces
/// the same text on every platform.
///
/// # Errors
///
/// Returns [`TrackError::Io`] for a component that is not valid UTF-8 and
/// [`TrackError::Format`] for a component containing a newline (the
/// manifest is line oriented and could not represent it).
pub fn to_manifest_path(relative: &Path) -> TrackResult<String> {
    let mut parts = Vec::new();

    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| TrackError::Io {
                    context: format!("reading path {}", relative.display()),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "path is not valid UTF-8",
                    ),
                })?;
                if name.contains('\n') {
                    return Err(TrackError::format(
                        relative,
                        0,
                        "path contains a newline and cannot be recorded",
                    ));
                }
                parts.push(name);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(TrackError::format(
                    relative,
                    0,
                    "path escapes the walk root",
                ));
            }
        }
    }

    Ok(parts.join("/"))
}
