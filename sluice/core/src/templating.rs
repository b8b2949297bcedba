//! Loading a [`RunConfiguration`] from a file, with `${param}` substitution

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use regex::Regex;
use sluice_schemas::{RawConfig, RunConfiguration, ValidationError};
use tracing::debug;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    #[error("Configuration file not found: '{file_path}'")]
    #[diagnostic(
        code(sluice::config::file_not_found),
        help("Check that the file path is correct and the file exists")
    )]
    NotFound {
        #[source]
        source: std::io::Error,
        file_path: String,
    },

    #[error("Unsupported configuration format: '{0}'")]
    #[diagnostic(
        code(sluice::config::unknown_format),
        help(
            "The configuration format '{0}' is not supported in this build.\n\
             \n\
             Available formats in this build:\n\
             {}",
            Self::available_formats()
        )
    )]
    UnknownFormat(ConfigFormat),

    #[error("Missing template parameters: {0:?}")]
    #[diagnostic(
        code(sluice::config::missing_params),
        help(
            "Provide the missing parameters using the -p flag.\n\
              \n\
              Example:\n\
              sluice run -f conf.toml -p sftp_password=value1 -p db_password=value2"
        )
    )]
    MissingParams(BTreeSet<String>),

    #[cfg(feature = "json")]
    #[error("JSON parsing error")]
    #[diagnostic(code(sluice::config::json_parse_error))]
    ParseJson {
        #[source_code]
        source_code: Arc<NamedSource<String>>,
        #[label("{}", error)]
        span: SourceSpan,
        #[source]
        error: serde_json::Error,
    },

    #[cfg(feature = "yaml")]
    #[error("YAML parsing error")]
    #[diagnostic(code(sluice::config::yaml_parse_error))]
    ParseYaml {
        #[source_code]
        source_code: Arc<NamedSource<String>>,
        #[label("{}", error)]
        span: SourceSpan,
        #[source]
        error: serde_yml::Error,
    },

    #[cfg(feature = "toml")]
    #[error("TOML parsing error")]
    #[diagnostic(code(sluice::config::toml_parse_error))]
    ParseToml {
        #[source_code]
        source_code: Arc<NamedSource<String>>,
        #[label("{}", error)]
        span: SourceSpan,
        #[source]
        error: toml::de::Error,
    },

    /// The file is well-formed but a value has the wrong type after substitution.
    /// Only the parser message is kept, the substituted text may hold secrets
    #[error("Invalid {format} configuration: {message}")]
    #[diagnostic(
        code(sluice::config::schema_error),
        help("Keys are grouped in the [SFTP], [DBServer] and [Email] sections, values are strings, numbers or booleans")
    )]
    Schema {
        format: ConfigFormat,
        message: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] ValidationError),
}

impl ConfigError {
    fn available_formats() -> String {
        let mut formats = vec![];

        #[cfg(feature = "json")]
        formats.push("• JSON (.json)");

        #[cfg(feature = "yaml")]
        formats.push("• YAML (.yaml, .yml)");

        #[cfg(feature = "toml")]
        formats.push("• TOML (.toml)");

        if formats.is_empty() {
            "No formats are currently enabled".to_string()
        } else {
            formats.join("\n")
        }
    }
}

/// Encoding of the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json files)
    Json,
    /// TOML format (.toml files)
    Toml,
    /// YAML format (.yml or .yaml files)
    Yaml,
    /// Unknown or unsupported format
    Unknown(String),
}

impl ConfigFormat {
    /// Infer the format from the file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path.as_ref().extension().and_then(|s| s.to_str());

        match ext {
            Some("toml") => ConfigFormat::Toml,
            Some("json") => ConfigFormat::Json,
            Some("yml") | Some("yaml") => ConfigFormat::Yaml,
            ext => ConfigFormat::Unknown(ext.unwrap_or("unknown_ext").to_string()),
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Toml => write!(f, "toml"),
            ConfigFormat::Yaml => write!(f, "yaml"),
            ConfigFormat::Unknown(format) => write!(f, "{format}"),
        }
    }
}

/// Loads a validated configuration from a file or a string.
///
/// The raw text may contain `${parameter_name}` placeholders (letters, digits and
/// underscores). They are replaced with the provided parameters before the text is
/// deserialized, which keeps secrets out of the file itself. Syntax errors are reported
/// against the text as written so diagnostics never show a substituted value.
pub trait ConfigLoader: Sized {
    /// Load a configuration file, see [`ConfigFormat::from_path`] for the supported extensions
    fn from_file<P: AsRef<Path>>(
        path: P,
        params: HashMap<String, String>,
    ) -> Result<Self, ConfigError>;

    /// Load a configuration from a string in the given format
    fn from_str<T: AsRef<str>>(
        value: T,
        format: ConfigFormat,
        params: HashMap<String, String>,
    ) -> Result<Self, ConfigError>;

    /// Replace every `${name}` with its value in `params`.
    ///
    /// Fails with [`ConfigError::MissingParams`] listing every placeholder that has no value.
    fn substitute_params(
        raw: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, ConfigError> {
        static PARAM_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PARAM_REGEX.get_or_init(|| {
            Regex::new("\\$\\{([a-zA-Z0-9_]+)\\}").expect("invalid regex")
        });

        let mut missing_params = BTreeSet::new();
        let definition = regex.replace_all(raw, |captures: &regex::Captures| {
            let name = &captures[1];
            match params.get(name) {
                Some(value) => value.clone(),
                None => {
                    missing_params.insert(name.to_string());
                    captures[0].to_string()
                }
            }
        });

        if !missing_params.is_empty() {
            return Err(ConfigError::MissingParams(missing_params));
        }

        Ok(definition.into_owned())
    }
}

impl ConfigLoader for RunConfiguration {
    fn from_file<P: AsRef<Path>>(
        path: P,
        params: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path);

        if let ConfigFormat::Unknown(_) = format {
            return Err(ConfigError::UnknownFormat(format));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::NotFound {
            source: e,
            file_path: path.display().to_string(),
        })?;

        debug!("Loading configuration from {}", path.display());

        Self::from_str(contents, format, params)
    }

    fn from_str<T: AsRef<str>>(
        value: T,
        format: ConfigFormat,
        params: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let contents = value.as_ref();

        debug!("Parsing configuration with format: {format}");

        let raw = match format {
            ConfigFormat::Toml => {
                #[cfg(feature = "toml")]
                {
                    toml::from_str::<toml::Value>(contents).map_err(|error| {
                        let offset = match error.span() {
                            Some(span) => SourceOffset::from(span.start),
                            None => SourceOffset::from(0),
                        };
                        ConfigError::ParseToml {
                            source_code: Arc::new(NamedSource::new(
                                "conf.toml",
                                contents.to_string(),
                            )),
                            span: SourceSpan::new(offset, 1),
                            error,
                        }
                    })?;

                    let definition = Self::substitute_params(contents, &params)?;
                    toml::from_str::<RawConfig>(&definition).map_err(|error| {
                        ConfigError::Schema {
                            format: ConfigFormat::Toml,
                            message: error.message().to_string(),
                        }
                    })?
                }
                #[cfg(not(feature = "toml"))]
                {
                    return Err(ConfigError::UnknownFormat(ConfigFormat::Toml));
                }
            }
            ConfigFormat::Json => {
                #[cfg(feature = "json")]
                {
                    serde_json::from_str::<serde_json::Value>(contents).map_err(|error| {
                        let offset =
                            SourceOffset::from_location(contents, error.line(), error.column());
                        ConfigError::ParseJson {
                            source_code: Arc::new(NamedSource::new(
                                "conf.json",
                                contents.to_string(),
                            )),
                            span: SourceSpan::new(offset, 1),
                            error,
                        }
                    })?;

                    let definition = Self::substitute_params(contents, &params)?;
                    serde_json::from_str::<RawConfig>(&definition).map_err(|error| {
                        ConfigError::Schema {
                            format: ConfigFormat::Json,
                            message: error.to_string(),
                        }
                    })?
                }
                #[cfg(not(feature = "json"))]
                {
                    return Err(ConfigError::UnknownFormat(ConfigFormat::Json));
                }
            }
            ConfigFormat::Yaml => {
                #[cfg(feature = "yaml")]
                {
                    serde_yml::from_str::<serde_yml::Value>(contents).map_err(|error| {
                        let offset = match error.location() {
                            Some(location) => SourceOffset::from_location(
                                contents,
                                location.line(),
                                location.column(),
                            ),
                            None => SourceOffset::from(0),
                        };
                        ConfigError::ParseYaml {
                            source_code: Arc::new(NamedSource::new(
                                "conf.yaml",
                                contents.to_string(),
                            )),
                            span: SourceSpan::new(offset, 1),
                            error,
                        }
                    })?;

                    let definition = Self::substitute_params(contents, &params)?;
                    serde_yml::from_str::<RawConfig>(&definition).map_err(|error| {
                        ConfigError::Schema {
                            format: ConfigFormat::Yaml,
                            message: error.to_string(),
                        }
                    })?
                }
                #[cfg(not(feature = "yaml"))]
                {
                    return Err(ConfigError::UnknownFormat(ConfigFormat::Yaml));
                }
            }
            fmt @ ConfigFormat::Unknown(_) => return Err(ConfigError::UnknownFormat(fmt)),
        };

        Ok(RunConfiguration::try_from(raw)?)
    }
}
