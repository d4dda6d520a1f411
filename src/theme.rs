use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::{load_settings_from, save_settings_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (light, dark)")),
        }
    }
}

/// Terminal dark-background hint from `COLORFGBG` ("fg;bg"). Background
/// indices 0-6 and 8 are the dark ANSI colours.
pub fn dark_mode_signal(colorfgbg: Option<&str>) -> Option<Theme> {
    let bg = colorfgbg?.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    Some(if bg <= 6 || bg == 8 { Theme::Dark } else { Theme::Light })
}

type Subscriber = Box<dyn Fn(Theme)>;

/// Process-wide theme with a single persisted key.
pub struct ThemeContext {
    theme: Theme,
    path: PathBuf,
    subscribers: Vec<Subscriber>,
}

impl ThemeContext {
    /// Saved preference first, then the terminal hint, then light.
    pub fn load(path: PathBuf) -> Self {
        let colorfgbg = std::env::var("COLORFGBG").ok();
        Self::load_with_signal(path, colorfgbg.as_deref())
    }

    pub fn load_with_signal(path: PathBuf, colorfgbg: Option<&str>) -> Self {
        let theme = load_settings_from(&path)
            .theme
            .or_else(|| dark_mode_signal(colorfgbg))
            .unwrap_or(Theme::Light);
        Self {
            theme,
            path,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> Theme {
        self.theme
    }

    /// Persist and notify subscribers in subscription order.
    pub fn set(&mut self, theme: Theme) -> Result<()> {
        let mut settings = load_settings_from(&self.path);
        settings.theme = Some(theme);
        save_settings_to(&self.path, &settings)?;
        self.theme = theme;
        tracing::info!(%theme, "theme changed");
        for subscriber in &self.subscribers {
            subscriber(theme);
        }
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.theme.toggled();
        self.set(next)?;
        Ok(next)
    }

    pub fn subscribe(&mut self, callback: impl Fn(Theme) + 'static) {
        self.subscribers.push(Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_saved_theme_wins_over_signal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme":"light"}"#).unwrap();
        let ctx = ThemeContext::load_with_signal(path, Some("15;0"));
        assert_eq!(ctx.get(), Theme::Light);
    }

    #[test]
    fn test_signal_used_when_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let ctx = ThemeContext::load_with_signal(path.clone(), Some("15;0"));
        assert_eq!(ctx.get(), Theme::Dark);
        let ctx = ThemeContext::load_with_signal(path.clone(), Some("0;15"));
        assert_eq!(ctx.get(), Theme::Light);
        let ctx = ThemeContext::load_with_signal(path, None);
        assert_eq!(ctx.get(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut ctx = ThemeContext::load_with_signal(path.clone(), None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ctx.subscribe(move |t| sink.borrow_mut().push(t));

        assert_eq!(ctx.toggle().unwrap(), Theme::Dark);
        assert_eq!(ctx.toggle().unwrap(), Theme::Light);
        ctx.set(Theme::Dark).unwrap();

        assert_eq!(*seen.borrow(), vec![Theme::Dark, Theme::Light, Theme::Dark]);
        let reloaded = ThemeContext::load_with_signal(path, Some("0;15"));
        assert_eq!(reloaded.get(), Theme::Dark);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.to_string(), "light");
    }
}
