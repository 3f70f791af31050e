//! `${VAR}` references in site settings.
//!
//! Credentials and the proxy URL accept `${VAR}` and `${VAR:-default}`.
//! The `graphviz` directory additionally accepts a leading `~`. A bare `$`
//! is kept as is, so a password such as `pa$$word` needs no escaping.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::ConfigError;

/// Looks up variables for the settings of one site section.
pub(crate) struct SiteVars<'a> {
    section: &'a str,
    lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
    home: Box<dyn Fn() -> Option<String> + 'a>,
}

impl<'a> SiteVars<'a> {
    /// Variables from the process environment.
    pub(crate) fn from_env(section: &'a str) -> Self {
        Self {
            section,
            lookup: Box::new(|name: &str| std::env::var(name).ok()),
            home: Box::new(|| {
                let home = shellexpand::tilde("~");
                (home != "~").then(|| home.into_owned())
            }),
        }
    }

    /// Variables from `lookup`; `HOME` provides the `~` replacement.
    #[cfg(test)]
    pub(crate) fn with_lookup(
        section: &'a str,
        lookup: impl Fn(&str) -> Option<String> + 'a,
    ) -> Self {
        let lookup = std::rc::Rc::new(lookup);
        let home = std::rc::Rc::clone(&lookup);
        Self {
            section,
            lookup: Box::new(move |name: &str| (*lookup)(name)),
            home: Box::new(move || (*home)("HOME")),
        }
    }

    /// Expand a text setting such as `password` or `proxy`.
    pub(crate) fn text(&self, key: &str, value: &str) -> Result<String, ConfigError> {
        if !value.contains("${") {
            return Ok(value.to_owned());
        }
        shellexpand::env_with_context(value, |name| self.get(name))
            .map(Cow::into_owned)
            .map_err(|e| self.unset(key, &e.var_name))
    }

    /// Expand a directory setting. Blank values mean "not set".
    pub(crate) fn dir(&self, key: &str, value: &str) -> Result<Option<PathBuf>, ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        let expanded = if value.contains("${") {
            shellexpand::full_with_context(value, || (self.home)(), |name| self.get(name))
                .map_err(|e| self.unset(key, &e.var_name))?
        } else {
            shellexpand::tilde_with_context(value, || (self.home)())
        };
        Ok(Some(PathBuf::from(expanded.into_owned())))
    }

    fn get(&self, name: &str) -> Result<Option<String>, ()> {
        (self.lookup)(name).map(Some).ok_or(())
    }

    fn unset(&self, key: &str, name: &str) -> ConfigError {
        ConfigError::EnvVar {
            field: format!("{}.{key}", self.section),
            message: format!("${{{name}}} not set"),
        }
    }
}
