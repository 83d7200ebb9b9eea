use std::fs;
use std::path::{Path, PathBuf};

use grammar::Options;
use parsegen::Strategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Defaults for requests that leave a field unset.
///
/// ```toml
/// strategy = "auto"
/// empty-symbols = ["eps", "ε"]
/// parser-name = "Calc"
/// module-name = "calc::parser"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Settings {
    pub strategy: Strategy,
    pub empty_symbols: Vec<String>,
    pub parser_name: String,
    pub module_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            strategy: Strategy::default(),
            empty_symbols: Options::default().empty_symbols,
            parser_name: "Parser".to_owned(),
            module_name: String::new(),
        }
    }
}

impl Settings {
    pub const FILE_NAME: &'static str = "llgen.toml";

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let settings = Settings::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load `llgen.toml` from `dir` if there is one.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(Self::FILE_NAME);
        if path.is_file() {
            Settings::load(&path)
        } else {
            Ok(Settings::default())
        }
    }

    pub fn options(&self) -> Options {
        Options {
            empty_symbols: self.empty_symbols.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_toml("strategy = \"auto\"\nparser-name = \"Calc\"").unwrap();
        assert_eq!(
            Settings {
                strategy: Strategy::Auto,
                parser_name: "Calc".to_owned(),
                ..Settings::default()
            },
            settings
        );
        assert_eq!(vec!["$", "eps"], settings.options().empty_symbols);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml("parser_name = \"Calc\"").is_err());
        assert!(Settings::from_toml("strategy = \"slr\"").is_err());
    }

    #[test]
    fn discover() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::default(), Settings::discover(dir.path()).unwrap());

        fs::write(
            dir.path().join(Settings::FILE_NAME),
            "empty-symbols = [\"eps\"]\nmodule-name = \"gen\"\n",
        )
        .unwrap();
        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(vec!["eps".to_owned()], settings.empty_symbols);
        assert_eq!("gen", settings.module_name);

        fs::write(dir.path().join(Settings::FILE_NAME), "strategy = 1").unwrap();
        let err = Settings::discover(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
