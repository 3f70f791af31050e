//! Configuration management for markpress.
//!
//! Parses the `config.toml` file (by default `~/.config/markpress/config.toml`).
//! Every top-level table is a named site section; the `[default]` section is
//! used when no site is selected and supplies fallback values for every other
//! section:
//!
//! ```toml
//! [default]
//! url = "https://blog.example.com"
//! user = "editor"
//! password = "${WP_PASSWORD}"
//! engine = "markdown"
//!
//! [work]
//! url = "intranet.example.com/blog"
//! proxy = "socks5://127.0.0.1:1080"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `url`, `user`, `password` and `proxy` support `${VAR}` and
//! `${VAR:-default}` expansion when a site is selected; `graphviz` also
//! accepts `~`.
//!
//! Older releases read an INI-style `config.ini`. Its sections carry over
//! unchanged, but TOML needs every string value quoted.

mod templates;
mod vars;

pub use templates::PageTemplates;

use vars::SiteVars;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default configuration file location.
const DEFAULT_CONFIG_PATH: &str = "~/.config/markpress/config.toml";

/// File name used by INI-style configurations.
const LEGACY_CONFIG_NAME: &str = "config.ini";

/// Name of the section used when no site is selected.
pub const DEFAULT_SECTION: &str = "default";

/// Default tab width handed to the markdown converters.
const DEFAULT_TABSIZE: usize = 4;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Raw site section as parsed from TOML. Every key is optional so that
/// sections can inherit from `[default]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SectionRaw {
    url: Option<String>,
    user: Option<String>,
    #[serde(alias = "passwd")]
    password: Option<String>,
    blog_id: Option<u32>,
    proxy: Option<String>,
    engine: Option<String>,
    tabsize: Option<usize>,
    graphviz: Option<String>,
    timeout: Option<u64>,
}

impl SectionRaw {
    /// Fill unset keys from `fallback`.
    fn inherit(&self, fallback: &Self) -> Self {
        Self {
            url: self.url.clone().or_else(|| fallback.url.clone()),
            user: self.user.clone().or_else(|| fallback.user.clone()),
            password: self.password.clone().or_else(|| fallback.password.clone()),
            blog_id: self.blog_id.or(fallback.blog_id),
            proxy: self.proxy.clone().or_else(|| fallback.proxy.clone()),
            engine: self.engine.clone().or_else(|| fallback.engine.clone()),
            tabsize: self.tabsize.or(fallback.tabsize),
            graphviz: self.graphviz.clone().or_else(|| fallback.graphviz.clone()),
            timeout: self.timeout.or(fallback.timeout),
        }
    }
}

/// Application configuration.
///
/// Constructed once per run and passed by reference to the components that
/// need it.
#[derive(Debug, Default)]
pub struct Config {
    sections: BTreeMap<String, SectionRaw>,
    /// Path the configuration was (or would have been) loaded from.
    pub config_path: PathBuf,
    /// Whether the configuration file exists.
    pub present: bool,
}

/// Validated connection settings for one target site.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Section name this site was selected from.
    pub name: String,
    /// Site URL (the XML-RPC endpoint is derived from it).
    pub url: String,
    /// Login name.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Blog identifier for multi-site installs.
    pub blog_id: u32,
    /// Optional proxy URL (`http://`, `socks4://`, `socks5://`).
    pub proxy: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout: u64,
    /// Rendering options resolved for this site.
    pub render: RenderConfig,
}

/// Options that control how documents are converted to HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Converter engine name (`default`, `markdown`, `pandoc`, `auto`).
    pub engine: String,
    /// Tab width for indented code.
    pub tabsize: usize,
    /// Extra directory searched for GraphViz executables.
    pub graphviz: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            engine: String::new(),
            tabsize: DEFAULT_TABSIZE,
            graphviz: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("missing config: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0} (string values must be quoted; INI-style files need converting)")]
    Parse(#[from] toml::de::Error),
    /// Requested site section does not exist.
    #[error("config section missing: {0}")]
    MissingSection(String),
    /// Validation error.
    #[error("config error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`work.password`").
        field: String,
        /// Error message (e.g., "${`WP_PASSWORD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("empty {field}")));
    }
    Ok(())
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `config_path` must exist. Without one the default location
    /// is used; a missing default file yields an empty configuration so that
    /// offline commands (`compile`, `dump`) keep working.
    ///
    /// # Errors
    ///
    /// Returns error if the explicit file is missing or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let default_path = Self::default_path();
        if default_path.exists() {
            Self::load_from_file(&default_path)
        } else {
            if let Some(legacy) = legacy_config(&default_path) {
                tracing::warn!(
                    "ignoring {}: convert it to TOML at {}",
                    legacy.display(),
                    default_path.display()
                );
            }
            tracing::debug!("no config file at {}", default_path.display());
            Ok(Self {
                sections: BTreeMap::new(),
                config_path: default_path,
                present: false,
            })
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on invalid TOML.
    pub fn from_toml(content: &str, config_path: &Path) -> Result<Self, ConfigError> {
        // Editors on Windows like to prepend a BOM.
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let sections: BTreeMap<String, SectionRaw> = toml::from_str(content)?;
        Ok(Self {
            sections,
            config_path: config_path.to_path_buf(),
            present: true,
        })
    }

    /// Default configuration path with `~` expanded.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).into_owned())
    }

    /// Directory holding the configuration file and page templates.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    /// Names of all configured site sections.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Select and validate a site section.
    ///
    /// `None` selects the `[default]` section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` when there is no config file,
    /// `ConfigError::MissingSection` for an unknown site, and
    /// `ConfigError::Validation` when `url` or `user` is empty.
    pub fn select(&self, site: Option<&str>) -> Result<SiteConfig, ConfigError> {
        if !self.present {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }
        let name = site
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SECTION);
        let section = self
            .resolved_section(name)
            .ok_or_else(|| ConfigError::MissingSection(name.to_owned()))?;

        let vars = SiteVars::from_env(name);
        let url = vars.text("url", section.url.as_deref().unwrap_or(""))?;
        let user = vars.text("user", section.user.as_deref().unwrap_or(""))?;
        let password = vars.text("password", section.password.as_deref().unwrap_or(""))?;
        let proxy = match section.proxy.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => Some(vars.text("proxy", p)?),
            _ => None,
        };
        let graphviz = match section.graphviz.as_deref() {
            Some(dir) => vars.dir("graphviz", dir)?,
            None => None,
        };

        require_non_empty(&url, "url")?;
        require_non_empty(&user, "user")?;

        Ok(SiteConfig {
            name: name.to_owned(),
            url: url.trim().to_owned(),
            user: user.trim().to_owned(),
            password: password.trim().to_owned(),
            blog_id: section.blog_id.unwrap_or(0),
            proxy,
            timeout: section.timeout.unwrap_or(DEFAULT_TIMEOUT),
            render: Self::render_from(&section, graphviz),
        })
    }

    /// Rendering options for a site, falling back to `[default]` and then to
    /// built-in defaults. Never fails so that offline commands work without
    /// a configured site.
    #[must_use]
    pub fn render_config(&self, site: Option<&str>) -> RenderConfig {
        let name = site.unwrap_or(DEFAULT_SECTION);
        let Some(section) = self
            .resolved_section(name)
            .or_else(|| self.resolved_section(DEFAULT_SECTION))
        else {
            return RenderConfig::default();
        };
        let graphviz = section.graphviz.as_deref().and_then(|dir| {
            SiteVars::from_env(name)
                .dir("graphviz", dir)
                .unwrap_or_else(|e| {
                    tracing::warn!("{e}");
                    None
                })
        });
        Self::render_from(&section, graphviz)
    }

    /// Page templates (`style.css`, `header.html`, `footer.html`) stored next
    /// to the configuration file.
    #[must_use]
    pub fn templates(&self) -> PageTemplates {
        PageTemplates::load(&self.config_dir())
    }

    fn resolved_section(&self, name: &str) -> Option<SectionRaw> {
        let section = self.sections.get(name)?;
        match self.sections.get(DEFAULT_SECTION) {
            Some(default) if name != DEFAULT_SECTION => Some(section.inherit(default)),
            _ => Some(section.clone()),
        }
    }

    fn render_from(section: &SectionRaw, graphviz: Option<PathBuf>) -> RenderConfig {
        RenderConfig {
            engine: section
                .engine
                .as_deref()
                .map(|e| e.trim().to_owned())
                .unwrap_or_default(),
            tabsize: section.tabsize.unwrap_or(DEFAULT_TABSIZE),
            graphviz,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, path)
    }
}

/// INI-style configuration left next to a missing TOML one.
fn legacy_config(path: &Path) -> Option<PathBuf> {
    let legacy = path.with_file_name(LEGACY_CONFIG_NAME);
    legacy.is_file().then_some(legacy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[default]
url = "https://blog.example.com"
user = "editor"
passwd = "secret"
engine = "markdown"
tabsize = 2

[work]
url = "intranet.example.com/blog"
proxy = "socks5://127.0.0.1:1080"
blog_id = 3

[broken]
user = ""
"#;

    fn sample() -> Config {
        Config::from_toml(SAMPLE, Path::new("/home/u/.config/markpress/config.toml")).unwrap()
    }

    #[test]
    fn test_select_default_section() {
        let site = sample().select(None).unwrap();
        assert_eq!(site.name, "default");
        assert_eq!(site.url, "https://blog.example.com");
        assert_eq!(site.user, "editor");
        assert_eq!(site.password, "secret");
        assert_eq!(site.blog_id, 0);
        assert_eq!(site.proxy, None);
        assert_eq!(site.timeout, 30);
        assert_eq!(site.render.engine, "markdown");
        assert_eq!(site.render.tabsize, 2);
    }

    #[test]
    fn test_select_named_section_inherits_default() {
        let site = sample().select(Some("work")).unwrap();
        assert_eq!(site.name, "work");
        assert_eq!(site.url, "intranet.example.com/blog");
        assert_eq!(site.user, "editor");
        assert_eq!(site.password, "secret");
        assert_eq!(site.blog_id, 3);
        assert_eq!(site.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(site.render.engine, "markdown");
    }

    #[test]
    fn test_blank_site_name_selects_default() {
        let site = sample().select(Some("  ")).unwrap();
        assert_eq!(site.name, "default");
    }

    #[test]
    fn test_missing_section() {
        let err = sample().select(Some("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(ref s) if s == "nope"));
        assert_eq!(err.to_string(), "config section missing: nope");
    }

    #[test]
    fn test_empty_user_is_invalid() {
        let err = sample().select(Some("broken")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(err.to_string(), "config error: empty user");
    }

    #[test]
    fn test_empty_url_is_invalid() {
        let config = Config::from_toml("[default]\nuser = \"a\"\n", Path::new("c.toml")).unwrap();
        let err = config.select(None).unwrap_err();
        assert_eq!(err.to_string(), "config error: empty url");
    }

    #[test]
    fn test_absent_config_refuses_select() {
        let config = Config {
            config_path: PathBuf::from("/nowhere/config.toml"),
            ..Default::default()
        };
        let err = config.select(None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_render_config_without_sections() {
        let config = Config::default();
        assert_eq!(config.render_config(Some("work")), RenderConfig::default());
    }

    #[test]
    fn test_render_config_unknown_site_uses_default() {
        let render = sample().render_config(Some("unknown"));
        assert_eq!(render.engine, "markdown");
        assert_eq!(render.tabsize, 2);
    }

    #[test]
    fn test_config_dir() {
        assert_eq!(
            sample().config_dir(),
            PathBuf::from("/home/u/.config/markpress")
        );
    }

    #[test]
    fn test_sections_listed() {
        let config = sample();
        let names: Vec<_> = config.sections().collect();
        assert_eq!(names, vec!["broken", "default", "work"]);
    }

    #[test]
    fn test_password_env_expansion() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MP_TEST_WP_PASSWORD", "from-env");
        }
        let toml = r#"
[default]
url = "https://blog.example.com"
user = "editor"
password = "${MP_TEST_WP_PASSWORD}"
"#;
        let config = Config::from_toml(toml, Path::new("c.toml")).unwrap();
        assert_eq!(config.select(None).unwrap().password, "from-env");
        unsafe {
            std::env::remove_var("MP_TEST_WP_PASSWORD");
        }
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "\u{feff}[default]\nurl = \"x.org\"\nuser = \"u\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(config.present);
        assert_eq!(config.config_dir(), tmp.path());
        assert_eq!(config.select(None).unwrap().url, "x.org");
    }

    #[test]
    fn test_ini_values_rejected_with_hint() {
        let err = Config::from_toml("[default]\nurl = blog.example.com\n", Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("INI-style files need converting"));
    }

    #[test]
    fn test_legacy_config_detected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        assert_eq!(legacy_config(&path), None);

        std::fs::write(tmp.path().join("config.ini"), "[default]\nurl = x\n").unwrap();
        assert_eq!(legacy_config(&path), Some(tmp.path().join("config.ini")));
    }

    #[test]
    fn test_graphviz_tilde_expanded() {
        let config = Config::from_toml(
            "[default]\nurl = \"x.org\"\nuser = \"u\"\ngraphviz = \"~/graphviz\"\n",
            Path::new("c.toml"),
        )
        .unwrap();
        let graphviz = config.select(None).unwrap().render.graphviz.unwrap();
        assert!(graphviz.ends_with("graphviz"));
        assert!(!graphviz.starts_with("~"));
        assert_eq!(config.render_config(None).graphviz, Some(graphviz));
    }
}
