use std::path::PathBuf;

use crate::error::{ReceivablesError, Result};
use crate::settings::settings_path;
use crate::theme::{Theme, ThemeContext};

pub fn run(value: Option<&str>) -> Result<()> {
    let message = apply(settings_path(), value)?;
    println!("{message}");
    Ok(())
}

/// Show the current theme, or set/toggle it. Returns the line to print.
pub fn apply(path: PathBuf, value: Option<&str>) -> Result<String> {
    let mut ctx = ThemeContext::load(path);
    match value.map(str::trim) {
        None => Ok(format!("Theme: {}", ctx.get())),
        Some("toggle") => {
            let theme = ctx.toggle()?;
            Ok(format!("Theme set to {theme}"))
        }
        Some(other) => {
            let theme: Theme = other.parse().map_err(ReceivablesError::Other)?;
            ctx.set(theme)?;
            Ok(format!("Theme set to {theme}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(apply(path.clone(), Some("dark")).unwrap(), "Theme set to dark");
        assert_eq!(apply(path.clone(), None).unwrap(), "Theme: dark");
        assert_eq!(apply(path.clone(), Some("toggle")).unwrap(), "Theme set to light");
        assert_eq!(apply(path, None).unwrap(), "Theme: light");
    }

    #[test]
    fn test_unknown_theme_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = apply(dir.path().join("settings.json"), Some("sepia")).unwrap_err();
        assert!(err.to_string().contains("sepia"));
    }
}
