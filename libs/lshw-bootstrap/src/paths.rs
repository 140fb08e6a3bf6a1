use std::env;
use std::path::{Path, PathBuf};

/// Errors for resolving user-supplied file locations
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("HOME environment variable is not set")]
    HomeMissing,
    #[error("file does not exist: {0}")]
    NotFound(String),
}

/// Expand a leading `~` to the user's home directory.
///
/// Returns the path unchanged if no tilde prefix is present. On Windows the
/// home directory comes from `USERPROFILE`, falling back to `HOME`.
///
/// # Errors
/// [`PathError::HomeMissing`] if the path starts with `~` and no home
/// directory variable is set.
pub fn expand_tilde(raw: &str) -> Result<PathBuf, PathError> {
    let rest = if raw == "~" {
        ""
    } else if let Some(rest) = raw.strip_prefix("~/") {
        rest
    } else if cfg!(target_os = "windows")
        && let Some(rest) = raw.strip_prefix("~\\")
    {
        rest
    } else {
        return Ok(PathBuf::from(raw));
    };

    let home = if cfg!(target_os = "windows") {
        env::var("USERPROFILE").or_else(|_| env::var("HOME"))
    } else {
        env::var("HOME")
    }
    .map_err(|_| PathError::HomeMissing)?;

    Ok(if rest.is_empty() {
        PathBuf::from(home)
    } else {
        Path::new(&home).join(rest)
    })
}

/// Expand `raw` and require the result to name an existing file.
///
/// # Errors
/// See [`expand_tilde`]; [`PathError::NotFound`] when nothing exists there.
pub fn resolve_existing(raw: &str) -> Result<PathBuf, PathError> {
    let path = expand_tilde(raw)?;
    if path.is_file() {
        Ok(path)
    } else {
        Err(PathError::NotFound(path.display().to_string()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn expands_home_prefix() {
        temp_env::with_var("HOME", Some("/home/inventory"), || {
            assert_eq!(expand_tilde("~").unwrap(), PathBuf::from("/home/inventory"));
            assert_eq!(
                expand_tilde("~/lshw/config.yaml").unwrap(),
                PathBuf::from("/home/inventory/lshw/config.yaml")
            );
            assert_eq!(expand_tilde("/etc/lshw.yaml").unwrap(), PathBuf::from("/etc/lshw.yaml"));
            assert_eq!(expand_tilde("~other/x").unwrap(), PathBuf::from("~other/x"));
        });
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn missing_home_is_an_error() {
        temp_env::with_var_unset("HOME", || {
            assert!(matches!(expand_tilde("~/x"), Err(PathError::HomeMissing)));
            assert!(expand_tilde("relative/x").is_ok());
        });
    }

    #[test]
    fn resolve_existing_requires_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("snapshot.json");
        std::fs::write(&file, "{}").unwrap();

        assert_eq!(resolve_existing(file.to_str().unwrap()).unwrap(), file);
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            resolve_existing(missing.to_str().unwrap()),
            Err(PathError::NotFound(_))
        ));
    }
}
