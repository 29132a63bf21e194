//! User configuration: service location, startup column, keybindings.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/forecast-dash/config.toml` (default
//! `~/.config/forecast-dash/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_COLUMN: &str = "Space economy";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SliderPrev,
    SliderNext,
    SliderFirst,
    SliderLast,
    OpenColumns,
    Refresh,
    Quit,
}

impl Action {
    pub const ALL: &[Action] = &[
        Action::SliderPrev,
        Action::SliderNext,
        Action::SliderFirst,
        Action::SliderLast,
        Action::OpenColumns,
        Action::Refresh,
        Action::Quit,
    ];

    fn config_key(self) -> &'static str {
        match self {
            Action::SliderPrev => "slider_prev",
            Action::SliderNext => "slider_next",
            Action::SliderFirst => "slider_first",
            Action::SliderLast => "slider_last",
            Action::OpenColumns => "open_columns",
            Action::Refresh => "refresh",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Named keys: (config name, display glyph, code).
const NAMED_KEYS: &[(&str, &str, KeyCode)] = &[
    ("Up", "↑", KeyCode::Up),
    ("Down", "↓", KeyCode::Down),
    ("Left", "←", KeyCode::Left),
    ("Right", "→", KeyCode::Right),
    ("Enter", "Enter", KeyCode::Enter),
    ("Esc", "Esc", KeyCode::Esc),
    ("Tab", "Tab", KeyCode::Tab),
    ("Home", "Home", KeyCode::Home),
    ("End", "End", KeyCode::End),
    ("PageUp", "PgUp", KeyCode::PageUp),
    ("PageDown", "PgDn", KeyCode::PageDown),
    ("Space", "Space", KeyCode::Char(' ')),
];

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    fn modifier_mask() -> KeyModifiers {
        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT
    }

    /// Only CTRL/ALT/SHIFT take part in matching.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = Self::modifier_mask();
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-facing form, e.g. `"←"`, `"Ctrl+r"`.
    pub fn display(&self) -> String {
        self.render(|(_, glyph, _)| *glyph)
    }

    /// Config-file form, e.g. `"Left"`, `"Ctrl+r"`.
    fn to_config_string(&self) -> String {
        self.render(|(name, _, _)| *name)
    }

    fn render(&self, pick: impl Fn(&(&'static str, &'static str, KeyCode)) -> &'static str) -> String {
        let mut s = String::new();
        for (flag, prefix) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(prefix);
            }
        }
        match NAMED_KEYS.iter().find(|(_, _, code)| *code == self.code) {
            Some(entry) => s.push_str(pick(entry)),
            None => match self.code {
                KeyCode::Char(c) => s.push(c),
                KeyCode::F(n) => s.push_str(&format!("F{n}")),
                other => s.push_str(&format!("{other:?}")),
            },
        }
        s
    }

    /// Parse `"Ctrl+r"`, `"Left"`, `"h"`, `"F5"`.
    fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key_part = parts.pop()?;
        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let lower = key_part.to_lowercase();
        let code = if let Some((_, _, code)) = NAMED_KEYS
            .iter()
            .find(|(name, _, _)| name.to_lowercase() == lower)
        {
            *code
        } else if lower.len() > 1 && lower.starts_with('f') {
            KeyCode::F(lower[1..].parse().ok()?)
        } else {
            let mut chars = key_part.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Base URL of the forecast service.
    pub service_url: String,
    /// Column selected at startup.
    pub default_column: String,
    pub request_timeout_secs: u64,
    /// Optional JSON file with extra column descriptions.
    pub info_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            default_column: DEFAULT_COLUMN.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            info_path: None,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(SliderPrev, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(SliderNext, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(SliderFirst, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(SliderLast, vec![KeyBind::new(End, n), KeyBind::new(Char('G'), KeyModifiers::SHIFT)]);
        m.insert(OpenColumns, vec![KeyBind::new(Enter, n), KeyBind::new(Char('c'), n)]);
        m.insert(Refresh, vec![KeyBind::new(Char('r'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The action bound to `event`; the binding with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// First key bound to `action`, in display form.
    pub fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action).and_then(|b| b.first()) {
            Some(bind) => bind.display(),
            None => "?".into(),
        }
    }

    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: horizon | {}: series | {}: refresh | {}: quit",
            self.short_binding(Action::SliderPrev),
            self.short_binding(Action::SliderNext),
            self.short_binding(Action::OpenColumns),
            self.short_binding(Action::Refresh),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(e) => {
                if path.exists() {
                    tracing::warn!("cannot read config {}: {e}", path.display());
                }
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "service_url" => {
                    if !value.is_empty() {
                        config.service_url = value.to_string();
                    }
                    continue;
                }
                "default_column" => {
                    if !value.is_empty() {
                        config.default_column = value.to_string();
                    }
                    continue;
                }
                "request_timeout_secs" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.request_timeout_secs = v.clamp(1, 600);
                    }
                    continue;
                }
                "info_path" => {
                    config.info_path = (!value.is_empty()).then(|| PathBuf::from(value));
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!("unknown config key: {key}");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# forecast-dash configuration".to_string(),
            String::new(),
            "# Forecast service".to_string(),
            format!("service_url = \"{}\"", self.service_url),
            format!("default_column = \"{}\"", self.default_column),
            format!("request_timeout_secs = {}", self.request_timeout_secs),
        ];
        if let Some(path) = &self.info_path {
            lines.push(format!("info_path = \"{}\"", path.display()));
        }
        lines.extend([
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ]);

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// `$XDG_CONFIG_HOME/forecast-dash/config.toml`.
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("forecast-dash").join("config.toml")
}
