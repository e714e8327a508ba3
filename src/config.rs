//! Run settings: `build-docs.toml` plus command-line overrides.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "build-docs.toml";

/// Resolved options consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Page title of the rendered document.
    pub title: String,
    /// Files, directories or glob patterns to scan.
    pub target_paths: Vec<String>,
    pub output_path: PathBuf,
    /// Output file stem; the renderer supplies the extension.
    pub output_name: String,
    /// `html`, `json` or `markdown`.
    pub format: String,
    /// Extensions (without the dot) picked up when walking directories.
    pub file_types: Vec<String>,
    /// A path containing any of these substrings is skipped.
    pub ignore_paths: Vec<String>,
    /// Regex for comment blocks; `None` means `/** ... */`.
    pub comment_pattern: Option<String>,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    pub html: HtmlSettings,
}

/// Extra markup for the HTML page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlSettings {
    /// Raw attribute strings, one `<meta>` each.
    pub meta: Vec<String>,
    /// Script URLs.
    pub scripts: Vec<String>,
    /// Stylesheet URLs.
    pub styles: Vec<String>,
    pub body_classes: Vec<String>,
    /// Replaces the built-in stylesheet when set.
    pub inline_css: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Documentation".into(),
            target_paths: vec![".".into()],
            output_path: PathBuf::from("./.dist"),
            output_name: "docs".into(),
            format: "html".into(),
            file_types: vec!["js".into(), "ts".into()],
            ignore_paths: vec![
                "node_modules".into(),
                "_ARCHIVE".into(),
                "_thunder-client".into(),
                ".vscode".into(),
            ],
            comment_pattern: None,
            log_level: "info".into(),
            html: HtmlSettings::default(),
        }
    }
}

impl Default for HtmlSettings {
    fn default() -> Self {
        Self {
            meta: vec![
                r#"charset="utf-8""#.into(),
                r#"name="viewport" content="width=device-width, initial-scale=1""#.into(),
            ],
            scripts: Vec::new(),
            styles: Vec::new(),
            body_classes: Vec::new(),
            inline_css: None,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub target_paths: Vec<String>,
    pub output_path: Option<PathBuf>,
    pub output_name: Option<String>,
    pub format: Option<String>,
    pub file_types: Vec<String>,
    pub ignore_paths: Vec<String>,
}

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content).context("invalid config")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path`, or from `build-docs.toml` in the working directory
    /// when it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let candidate = PathBuf::from(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Apply command-line values. Lists replace the configured lists.
    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(title) = overrides.title {
            self.title = title;
        }
        if !overrides.target_paths.is_empty() {
            self.target_paths = overrides.target_paths;
        }
        if let Some(output) = overrides.output_path {
            self.output_path = output;
        }
        if let Some(name) = overrides.output_name {
            self.output_name = name;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        if !overrides.file_types.is_empty() {
            self.file_types = overrides.file_types;
        }
        if !overrides.ignore_paths.is_empty() {
            self.ignore_paths = overrides.ignore_paths;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.file_types.is_empty() {
            bail!("file_types must list at least one extension");
        }
        if self.output_name.is_empty() || self.output_name.contains(['/', '\\']) {
            bail!("output_name must be a plain file name: {:?}", self.output_name);
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            bail!(
                "unknown log_level: {}. Use one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml_str(
            r#"
title = "My Lib"
file_types = ["ts", "tsx"]

[html]
scripts = ["app.js"]
"#,
        )
        .unwrap();
        assert_eq!(settings.title, "My Lib");
        assert_eq!(settings.file_types, vec!["ts", "tsx"]);
        assert_eq!(settings.html.scripts, vec!["app.js"]);
        assert_eq!(settings.html.meta, HtmlSettings::default().meta);
        assert_eq!(settings.format, "html");
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(Settings::from_toml_str("titel = \"typo\"").is_err());
    }

    #[test]
    fn bad_log_level_rejected() {
        let err = Settings::from_toml_str("log_level = \"loud\"").unwrap_err();
        assert!(format!("{:#}", err).contains("unknown log_level"));
    }

    #[test]
    fn overrides_win() {
        let mut settings = Settings::default();
        settings
            .apply(Overrides {
                title: Some("CLI".into()),
                target_paths: vec!["src".into()],
                format: Some("json".into()),
                ignore_paths: vec!["vendor".into()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(settings.title, "CLI");
        assert_eq!(settings.target_paths, vec!["src"]);
        assert_eq!(settings.format, "json");
        assert_eq!(settings.ignore_paths, vec!["vendor"]);
        assert_eq!(settings.file_types, vec!["js", "ts"]);
    }

    #[test]
    fn output_name_must_be_plain() {
        let mut settings = Settings::default();
        let result = settings.apply(Overrides {
            output_name: Some("../escape".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"output_name = \"reference\"\n").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.output_name, "reference");
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        assert!(Settings::load(Some(Path::new("/nonexistent/build-docs.toml"))).is_err());
    }
}
