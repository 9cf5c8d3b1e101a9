use std::{fmt, path::Path, path::PathBuf, str::FromStr, time::Duration};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use super::template::{NameTemplate, TemplateError};

/// A bible version identifier such as `KJV` or `ESV`.
///
/// Stored uppercase. Templates and paths ask for the case they need.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(NonEmptyString);

impl Version {
    /// Creates a version identifier, normalising it to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or only whitespace.
    pub fn new(s: &str) -> Result<Self, InvalidVersionError> {
        NonEmptyString::new(s.trim().to_uppercase())
            .map(Self)
            .map_err(|_| InvalidVersionError(s.to_string()))
    }

    /// The uppercase identifier, as passed to the converter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The lowercase identifier, as used in output paths.
    #[must_use]
    pub fn lowercase(&self) -> String {
        self.0.as_str().to_lowercase()
    }
}

impl FromStr for Version {
    type Err = InvalidVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a version identifier is blank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid version '{0}': must not be empty")]
pub struct InvalidVersionError(String);

/// Content the converter should leave out of each chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Exclusions {
    /// Do not bold the words of Jesus.
    pub bold_words: bool,
    /// Leave out the copyright notice.
    pub copyright: bool,
    /// Leave out editorial headers.
    pub headers: bool,
    /// Leave out footnotes.
    pub footnotes: bool,
    /// Leave out cross-references.
    pub cross_references: bool,
}

impl Exclusions {
    /// The converter flags that implement these exclusions.
    ///
    /// The converter bolds nothing unless asked to, so `-b` is passed when bold
    /// words are *not* excluded.
    #[must_use]
    pub fn converter_flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::with_capacity(5);
        if !self.bold_words {
            flags.push("-b");
        }
        if self.copyright {
            flags.push("-c");
        }
        if self.headers {
            flags.push("-e");
        }
        if self.footnotes {
            flags.push("-f");
        }
        if self.cross_references {
            flags.push("-r");
        }
        flags
    }
}

/// Settings that can be read from a TOML file.
///
/// Every field has a default, so an empty file (apart from the version tag) is
/// valid. Command-line flags override anything set here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Settings {
    /// Replacement for spaces in book names, e.g. `1 Samuel` -> `1_Samuel`.
    pub divider: String,

    /// Template for book folder names.
    pub book_name: String,

    /// Template for chapter file names (without the `.md` extension).
    pub chapter_name: String,

    /// The directory the vault is written under.
    ///
    /// Each version gets its own subdirectory.
    pub output: PathBuf,

    /// Minimum gap between the end of one converter call and the start of the
    /// next, in milliseconds.
    pub cooldown_ms: u64,

    /// How long a single converter call may run before it is killed.
    pub timeout_secs: u64,

    /// The converter program followed by its leading arguments.
    pub converter: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            divider: default_divider(),
            book_name: default_book_name(),
            chapter_name: default_chapter_name(),
            output: default_output(),
            cooldown_ms: default_cooldown_ms(),
            timeout_secs: default_timeout_secs(),
            converter: default_converter(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the settings to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn default_divider() -> String {
    "_".to_string()
}

fn default_book_name() -> String {
    NameTemplate::DEFAULT_FOLDER.to_string()
}

fn default_chapter_name() -> String {
    NameTemplate::DEFAULT_FILE.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("bin")
}

const fn default_cooldown_ms() -> u64 {
    100
}

const fn default_timeout_secs() -> u64 {
    60
}

fn default_converter() -> Vec<String> {
    vec!["ruby".to_string(), "bg2md.rb".to_string()]
}

/// The serialized versions of the settings file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_divider")]
        divider: String,

        #[serde(default = "default_book_name")]
        book_name: String,

        #[serde(default = "default_chapter_name")]
        chapter_name: String,

        #[serde(default = "default_output")]
        output: PathBuf,

        #[serde(default = "default_cooldown_ms")]
        cooldown_ms: u64,

        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,

        #[serde(default = "default_converter")]
        converter: Vec<String>,
    },
}

impl From<Versions> for Settings {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                divider,
                book_name,
                chapter_name,
                output,
                cooldown_ms,
                timeout_secs,
                converter,
            } => Self {
                divider,
                book_name,
                chapter_name,
                output,
                cooldown_ms,
                timeout_secs,
                converter,
            },
        }
    }
}

impl From<Settings> for Versions {
    fn from(settings: Settings) -> Self {
        let Settings {
            divider,
            book_name,
            chapter_name,
            output,
            cooldown_ms,
            timeout_secs,
            converter,
        } = settings;
        Self::V1 {
            divider,
            book_name,
            chapter_name,
            output,
            cooldown_ms,
            timeout_secs,
            converter,
        }
    }
}

/// Everything a single download run needs to know, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    version: Version,
    divider: String,
    folder_template: NameTemplate,
    file_template: NameTemplate,
    exclusions: Exclusions,
    output: PathBuf,
    cooldown: Duration,
    timeout: Duration,
    converter: NonEmpty<String>,
}

impl RunConfig {
    /// Validates `settings` and captures them for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if either name template is invalid, the chapter
    /// template has no index placeholder, or the converter command is empty.
    pub fn new(
        version: Version,
        settings: Settings,
        exclusions: Exclusions,
    ) -> Result<Self, SettingsError> {
        let folder_template = NameTemplate::parse(&settings.book_name)
            .map_err(|source| SettingsError::Template { field: "book_name", source })?;
        let file_template = NameTemplate::parse(&settings.chapter_name)
            .and_then(NameTemplate::require_index)
            .map_err(|source| SettingsError::Template { field: "chapter_name", source })?;
        let converter =
            NonEmpty::from_vec(settings.converter).ok_or(SettingsError::EmptyConverter)?;

        Ok(Self {
            version,
            divider: settings.divider,
            folder_template,
            file_template,
            exclusions,
            output: settings.output,
            cooldown: Duration::from_millis(settings.cooldown_ms),
            timeout: Duration::from_secs(settings.timeout_secs),
            converter,
        })
    }

    /// The version being downloaded.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// The replacement for spaces in book names.
    #[must_use]
    pub fn divider(&self) -> &str {
        &self.divider
    }

    /// Template for book folder names.
    #[must_use]
    pub const fn folder_template(&self) -> &NameTemplate {
        &self.folder_template
    }

    /// Template for chapter file names.
    #[must_use]
    pub const fn file_template(&self) -> &NameTemplate {
        &self.file_template
    }

    /// Content to leave out.
    #[must_use]
    pub const fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// The root output directory (before the per-version subdirectory).
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Minimum gap between converter calls.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Maximum run time for one converter call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The converter program and its leading arguments.
    #[must_use]
    pub const fn converter(&self) -> &NonEmpty<String> {
        &self.converter
    }
}

/// Errors raised while loading settings or building a [`RunConfig`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file {}", path.display())]
    Read {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for this schema.
    #[error("failed to parse settings file {}", path.display())]
    Parse {
        /// The file that was parsed.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },

    /// The settings could not be serialized.
    #[error("failed to serialize settings")]
    Serialize(#[source] toml::ser::Error),

    /// The settings file could not be written.
    #[error("failed to write settings file {}", path.display())]
    Write {
        /// The file that was written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A name template is invalid.
    #[error("invalid {field} template")]
    Template {
        /// Which setting held the template.
        field: &'static str,
        /// What was wrong with it.
        source: TemplateError,
    },

    /// The converter command has no program.
    #[error("converter command must not be empty")]
    EmptyConverter,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test]
    fn version_is_uppercased() {
        let version = Version::new(" kjv ").unwrap();
        assert_eq!(version.as_str(), "KJV");
        assert_eq!(version.lowercase(), "kjv");
    }

    #[test]
    fn blank_version_is_rejected() {
        assert!(Version::new("  ").is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test_case(Exclusions::default(), &["-b"]; "defaults bold words")]
    #[test_case(Exclusions { bold_words: true, ..Exclusions::default() }, &[]; "bold words disabled")]
    #[test_case(
        Exclusions { bold_words: true, copyright: true, headers: true, footnotes: true, cross_references: true },
        &["-c", "-e", "-f", "-r"];
        "everything excluded"
    )]
    #[test_case(Exclusions { footnotes: true, ..Exclusions::default() }, &["-b", "-f"]; "footnotes only")]
    fn exclusion_flags(exclusions: Exclusions, expected: &[&str]) {
        assert_eq!(exclusions.converter_flags(), expected);
    }

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ndivider = \"-\"\nbook_name = \"{order} {Book}\"\ncooldown_ms = 250\nconverter = [\"bg2md\"]\n",
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.divider, "-");
        assert_eq!(settings.book_name, "{order} {Book}");
        assert_eq!(settings.chapter_name, NameTemplate::DEFAULT_FILE);
        assert_eq!(settings.cooldown_ms, 250);
        assert_eq!(settings.converter, vec!["bg2md".to_string()]);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Settings::load(&missing).unwrap_err();
        assert!(matches!(error, SettingsError::Read { .. }));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ncooldown_ms = \"fast\"\n")
            .unwrap();

        let error = Settings::load(file.path()).unwrap_err();
        assert!(matches!(error, SettingsError::Parse { .. }));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Settings::default();
        let actual: Settings = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        let settings = Settings {
            divider: ".".to_string(),
            ..Settings::default()
        };

        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn run_config_rejects_bad_template() {
        let settings = Settings {
            chapter_name: "{book}-{verse}".to_string(),
            ..Settings::default()
        };
        let error = RunConfig::new(Version::new("kjv").unwrap(), settings, Exclusions::default())
            .unwrap_err();
        assert!(matches!(
            error,
            SettingsError::Template {
                field: "chapter_name",
                ..
            }
        ));
    }

    #[test]
    fn run_config_rejects_chapter_template_without_index() {
        let settings = Settings {
            chapter_name: "{version}-{book}".to_string(),
            ..Settings::default()
        };
        let error = RunConfig::new(Version::new("kjv").unwrap(), settings, Exclusions::default())
            .unwrap_err();
        assert!(matches!(
            error,
            SettingsError::Template {
                field: "chapter_name",
                source: TemplateError::MissingIndex(_),
            }
        ));
    }

    #[test]
    fn run_config_rejects_empty_converter() {
        let settings = Settings {
            converter: Vec::new(),
            ..Settings::default()
        };
        let error = RunConfig::new(Version::new("kjv").unwrap(), settings, Exclusions::default())
            .unwrap_err();
        assert!(matches!(error, SettingsError::EmptyConverter));
    }

    #[test]
    fn run_config_captures_durations() {
        let config = RunConfig::new(
            Version::new("kjv").unwrap(),
            Settings::default(),
            Exclusions::default(),
        )
        .unwrap();
        assert_eq!(config.cooldown(), Duration::from_millis(100));
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.converter().head, "ruby");
    }
}
