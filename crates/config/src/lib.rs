//! Layered configuration for conversion runs.
//!
//! Layers, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. `config.toml` in the platform configuration directory,
//! 3. an explicitly supplied file, parsed by extension (`toml`, `yaml`/`yml`
//!    or `json`),
//! 4. environment variables prefixed with `DOCSET_MD_`, using `__` between
//!    nested keys (`DOCSET_MD_FILTERS__LIMIT=10`).
//!
//! ```toml
//! output_dir = "docs/php"
//! verbose = false
//! generate_index = true
//!
//! [filters]
//! types = ["Function", "Class"]
//! limit = 500
//!
//! [search]
//! program = "docset-search-build"
//! args = ["--database", "{database}", "--output", "{output}"]
//!
//! [apple]
//! preload_blobs = true
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use docset_convert::ConversionOptions;
use docset_convert::search::SearchBinary;
use docset_format::FormatOptions;
use docset_model::EntryFilters;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of every configuration environment variable.
pub const ENV_PREFIX: &str = "DOCSET_MD_";
/// Separator between nested keys in environment variable names.
const ENV_SEPARATOR: &str = "__";
const APPLICATION: &str = "docset-md";
const PLATFORM_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Required; there is no default output directory.
    pub output_dir: PathBuf,
    pub verbose: bool,
    pub generate_index: bool,
    pub filters: EntryFilters,
    pub search: Option<SearchBinary>,
    pub apple: AppleConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::new(),
            verbose: false,
            generate_index: true,
            filters: EntryFilters::default(),
            search: None,
            apple: AppleConfig::default(),
        }
    }
}

/// Settings specific to Apple API bundles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppleConfig {
    /// Decompress every content blob up front instead of on first use.
    pub preload_blobs: bool,
}

/// `config.toml` in the platform configuration directory, if the platform
/// has one.
pub fn platform_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join(PLATFORM_FILE))
}

impl Config {
    /// Load every layer, with `file` as the explicitly supplied one.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_from(platform_config_file(), file)
    }

    fn load_from(platform: Option<PathBuf>, file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(platform) = platform.filter(|p| p.is_file()) {
            tracing::debug!(path = %platform.display(), "loading platform configuration");
            figment = figment.merge(Toml::file_exact(platform));
        }
        if let Some(file) = file {
            figment = merge_file(figment, file)?;
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
            .extract()
            .or_raise(|| ErrorKind::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Validation("output_dir must be set"));
        }
        if self.filters.limit == Some(0) {
            exn::bail!(ErrorKind::Validation("filters.limit must be at least 1"));
        }
        if self.search.as_ref().is_some_and(|search| search.program.trim().is_empty()) {
            exn::bail!(ErrorKind::Validation("search.program must not be empty"));
        }
        Ok(())
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions { preload_blobs: self.apple.preload_blobs }
    }

    pub fn into_options(self) -> ConversionOptions {
        ConversionOptions::new(self.output_dir)
            .with_verbose(self.verbose)
            .with_filters(self.filters)
            .with_generate_index(self.generate_index)
            .with_search(self.search)
    }
}

fn merge_file(figment: Figment, file: &Path) -> Result<Figment> {
    if !file.is_file() {
        exn::bail!(ErrorKind::NotFound(file.to_path_buf()));
    }
    let extension = file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    tracing::debug!(path = %file.display(), "loading configuration file");
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(file)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
        Some("json") => figment.merge(Json::file_exact(file)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults_need_output_dir() {
        Jail::expect_with(|_jail| {
            let err = Config::load_from(None, None).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Validation(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case("docset.toml", "output_dir = \"out\"\n[filters]\ntypes = [\"Function\"]\nlimit = 5\n")]
    #[case("docset.yaml", "output_dir: out\nfilters:\n  types: [Function]\n  limit: 5\n")]
    #[case("docset.json", r#"{"output_dir": "out", "filters": {"types": ["Function"], "limit": 5}}"#)]
    fn test_file_formats(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::load_from(None, Some(Path::new(name))).unwrap();
            assert_eq!(config.output_dir, Path::new("out"));
            assert!(config.filters.types.contains("Function"));
            assert_eq!(config.filters.limit, Some(5));
            assert!(config.generate_index);
            Ok(())
        });
    }

    #[test]
    fn test_layer_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file("platform.toml", "output_dir = \"platform\"\nverbose = true\n[apple]\npreload_blobs = true\n")?;
            jail.create_file("explicit.toml", "output_dir = \"explicit\"\ngenerate_index = false\n")?;
            jail.set_env("DOCSET_MD_GENERATE_INDEX", "true");
            jail.set_env("DOCSET_MD_FILTERS__LIMIT", "7");
            jail.set_env("DOCSET_MD_SEARCH__PROGRAM", "search-build");
            let config =
                Config::load_from(Some(jail.directory().join("platform.toml")), Some(Path::new("explicit.toml"))).unwrap();
            assert_eq!(config.output_dir, Path::new("explicit"));
            assert!(config.verbose);
            assert!(config.generate_index);
            assert_eq!(config.filters.limit, Some(7));
            assert_eq!(config.search.as_ref().map(|s| s.program.as_str()), Some("search-build"));
            assert!(config.format_options().preload_blobs);

            let options = config.into_options();
            assert_eq!(options.output_dir, Path::new("explicit"));
            assert_eq!(options.filters.limit, Some(7));
            assert!(options.search.is_some_and(|s| s.args.is_empty()));
            Ok(())
        });
    }

    #[test]
    fn test_missing_platform_file_is_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("DOCSET_MD_OUTPUT_DIR", "from-env");
            let config = Config::load_from(Some(jail.directory().join("absent.toml")), None).unwrap();
            assert_eq!(config.output_dir, Path::new("from-env"));
            Ok(())
        });
    }

    #[rstest]
    #[case("absent.toml", None)]
    #[case("docset.ini", Some("output_dir = out"))]
    fn test_bad_explicit_file(#[case] name: &str, #[case] contents: Option<&str>) {
        Jail::expect_with(|jail| {
            if let Some(contents) = contents {
                jail.create_file(name, contents)?;
            }
            let err = Config::load_from(None, Some(Path::new(name))).unwrap_err();
            match contents {
                None => assert!(matches!(&*err, ErrorKind::NotFound(_))),
                Some(_) => assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_))),
            }
            Ok(())
        });
    }

    #[rstest]
    #[case("output_dir = \"out\"\n[filters]\nlimit = 0\n")]
    #[case("output_dir = \"out\"\n[search]\nprogram = \"\"\n")]
    fn test_validation(#[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file("docset.toml", contents)?;
            let err = Config::load_from(None, Some(Path::new("docset.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Validation(_)));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file() {
        Jail::expect_with(|jail| {
            jail.create_file("docset.toml", "output_dir = [")?;
            let err = Config::load_from(None, Some(Path::new("docset.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Parse));
            Ok(())
        });
    }
}
