//! Configuration management for CommitCraft.
//!
//! Configuration is layered: built-in defaults, then the global file in
//! `<config_dir>/commitcraft/config.toml`, then `.commitcraft.toml` in the
//! working directory. Later layers override earlier ones key by key, except
//! for the commit type list which is appended to or replaced according to
//! each layer's `behavior`.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the environment variable holding the chat-completion API key.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Local (per-repository) configuration file name.
pub const LOCAL_CONFIG_FILE: &str = ".commitcraft.toml";

/// Errors raised while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Commit type list (already resolved after loading)
    pub commit_types: CommitTypesConfig,

    /// Final message formatting
    pub commit_format: CommitFormatConfig,

    /// Prompt templates and models for every pipeline stage
    pub prompts: PromptConfig,

    /// Release settings
    pub release: ReleaseConfig,

    /// Chat-completion endpoint settings
    pub ai: AiConfig,

    /// UI settings
    pub ui: UiConfig,
}

/// A commit type offered in the type picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitType {
    pub tag: String,
    #[serde(default)]
    pub description: String,
    /// Optional `#RRGGBB` color used when rendering the tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CommitType {
    pub fn new(tag: impl Into<String>, description: impl Into<String>) -> Self {
        Self { tag: tag.into(), description: description.into(), color: None }
    }
}

/// How a layer's commit types combine with the list accumulated so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeBehavior {
    #[default]
    Append,
    Replace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitTypesConfig {
    pub behavior: MergeBehavior,
    pub types: Vec<CommitType>,
}

impl Default for CommitTypesConfig {
    fn default() -> Self {
        Self { behavior: MergeBehavior::Replace, types: default_commit_types() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitFormatConfig {
    /// Template applied to the type tag; `%s` is replaced by the tag.
    pub type_format: String,
}

impl Default for CommitFormatConfig {
    fn default() -> Self {
        Self { type_format: "[%s]".to_string() }
    }
}

/// Prompt templates and the model each pipeline stage runs on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub summary_prompt: String,
    pub summary_prompt_model: String,
    /// Character budget for the staged diff fed to the summary stage
    pub summary_prompt_max_diff_size: usize,
    pub commit_builder_prompt: String,
    pub commit_builder_prompt_model: String,
    pub output_format_prompt: String,
    pub output_format_prompt_model: String,
    pub release_prompt: String,
    pub release_prompt_model: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let model = crate::ai::DEFAULT_MODEL.to_string();
        Self {
            summary_prompt: "You are a senior developer reviewing a change. Using the TITLE \
                written by the author and the staged diff in CONTEXT, summarize what changed \
                and why in a few short bullet points. Do not invent changes that are not in \
                the diff."
                .to_string(),
            summary_prompt_model: model.clone(),
            summary_prompt_max_diff_size: 20_000,
            commit_builder_prompt: "Write a commit message body from the summary you receive. \
                The first line is a single imperative sentence under 72 characters. Follow it \
                with a blank line and a short list of the relevant details."
                .to_string(),
            commit_builder_prompt_model: model.clone(),
            output_format_prompt: "Rewrite the commit message you receive in English. The \
                [PREAMBLE] line shows the type and scope that will prefix the message; do not \
                repeat it. Reply with the final commit message only, with no commentary or \
                markdown fences."
                .to_string(),
            output_format_prompt_model: model.clone(),
            release_prompt: "You write release notes from a list of commits separated by \
                '--- COMMIT SEPARATOR ---'. Reply with a one-line release title, then a blank \
                line, then the release body grouped by kind of change."
                .to_string(),
            release_prompt_model: model,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Release types offered when confirming a release
    pub types: Vec<String>,

    /// How many of the most recent commits the release picker loads
    pub max_commits: usize,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            types: ["MAJOR", "MINOR", "PATCH", "HOTFIX"].map(String::from).to_vec(),
            max_commits: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// OpenAI-compatible chat-completion endpoint
    pub base_url: String,

    /// Loaded from the environment, never written to a config file
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self { base_url: crate::ai::groq::DEFAULT_ENDPOINT.to_string(), api_key: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Built-in theme name
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "default".to_string() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commit_types: CommitTypesConfig::default(),
            commit_format: CommitFormatConfig::default(),
            prompts: PromptConfig::default(),
            release: ReleaseConfig::default(),
            ai: AiConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

/// The commit types every installation starts with.
pub fn default_commit_types() -> Vec<CommitType> {
    vec![
        CommitType::new("IMP", "Incremental improvements"),
        CommitType::new("FIX", "Bug fixes"),
        CommitType::new("ADD", "Adding new modules or features"),
        CommitType::new("REM", "Removing resources"),
        CommitType::new("REF", "Refactoring"),
        CommitType::new("MOV", "Moving files or code"),
        CommitType::new("REL", "Release commits"),
        CommitType::new("WIP", "Work in progress"),
        CommitType::new("DOC", "Documentation changes"),
    ]
}

/// Folds commit type layers over `base`.
///
/// `Replace` swaps the accumulated list for the layer's list (an empty
/// layer list leaves it untouched). `Append` adds new tags at the end and
/// overrides entries whose tag already exists, keeping their position.
pub fn resolve_commit_types(base: Vec<CommitType>, layers: &[CommitTypesConfig]) -> Vec<CommitType> {
    layers.iter().fold(base, |mut acc, layer| {
        match layer.behavior {
            MergeBehavior::Replace => {
                if !layer.types.is_empty() {
                    acc.clone_from(&layer.types);
                }
            }
            MergeBehavior::Append => {
                for ty in &layer.types {
                    match acc.iter_mut().find(|existing| existing.tag == ty.tag) {
                        Some(existing) => *existing = ty.clone(),
                        None => acc.push(ty.clone()),
                    }
                }
            }
        }
        acc
    })
}

/// Recursively overlays `overlay` onto `base`.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Where configuration and credentials live on disk.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub global: PathBuf,
    pub local: PathBuf,
    pub env_file: PathBuf,
}

impl ConfigPaths {
    /// Standard locations: the user config dir and `cwd`.
    pub fn discover(cwd: &Path) -> Result<Self, ConfigError> {
        let dir = Config::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::in_dir(&dir, cwd))
    }

    /// Locations rooted at an explicit config directory.
    pub fn in_dir(config_dir: &Path, cwd: &Path) -> Self {
        Self {
            global: config_dir.join("config.toml"),
            local: cwd.join(LOCAL_CONFIG_FILE),
            env_file: config_dir.join(".env"),
        }
    }
}

impl Config {
    /// Load configuration for the repository in `cwd`.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        Self::load_with(&ConfigPaths::discover(cwd)?)
    }

    /// Load configuration from explicit paths.
    ///
    /// Creates the global file from defaults when it does not exist yet.
    pub fn load_with(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        if !paths.global.exists() {
            Self::default().save_to(&paths.global)?;
            tracing::info!(path = %paths.global.display(), "created default global config");
        }

        let mut layers = vec![read_table(&paths.global)?];
        if paths.local.exists() {
            tracing::debug!(path = %paths.local.display(), "loading local config");
            layers.push(read_table(&paths.local)?);
        }

        let mut config = Self::from_layers(layers)
            .map_err(|(index, source)| {
                let path = if index == 0 { &paths.global } else { &paths.local };
                ConfigError::Parse { path: path.clone(), source }
            })?;
        config.ai.api_key = CredentialStore::new(&paths.env_file).load();

        Ok(config)
    }

    /// Resolve parsed layers, lowest priority first.
    ///
    /// On failure returns the index of the layer whose commit types could
    /// not be parsed, or the last layer for any other schema error.
    pub fn from_layers(layers: Vec<toml::Table>) -> Result<Self, (usize, toml::de::Error)> {
        let last = layers.len().saturating_sub(1);
        let mut merged = toml::Table::new();
        let mut type_layers = Vec::new();

        for (index, mut layer) in layers.into_iter().enumerate() {
            if let Some(section) = layer.remove("commit_types") {
                let parsed: CommitTypesConfig =
                    section.try_into().map_err(|err| (index, err))?;
                type_layers.push(parsed);
            }
            merge_tables(&mut merged, layer);
        }

        let mut config: Self = toml::Value::Table(merged).try_into().map_err(|err| (last, err))?;
        config.commit_types = CommitTypesConfig {
            behavior: MergeBehavior::Replace,
            types: resolve_commit_types(default_commit_types(), &type_layers),
        };

        Ok(config)
    }

    /// Write this configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
    }

    /// Resolved commit types in display order.
    pub fn commit_types(&self) -> &[CommitType] {
        &self.commit_types.types
    }

    /// Apply `type_format` to a tag.
    pub fn format_type(&self, tag: &str) -> String {
        if self.commit_format.type_format.contains("%s") {
            self.commit_format.type_format.replace("%s", tag)
        } else {
            tag.to_string()
        }
    }

    /// `"<formatted type> <scope>: <message>"`
    pub fn final_commit_message(&self, tag: &str, scope: &str, message: &str) -> String {
        format!("{} {}: {}", self.format_type(tag), scope, message)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("commitcraft"))
    }

    /// Get the data directory path (database, log file).
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("commitcraft"))
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    content.parse().map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Reads and writes the API key file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    env_file: PathBuf,
}

impl CredentialStore {
    pub fn new(env_file: impl Into<PathBuf>) -> Self {
        Self { env_file: env_file.into() }
    }

    pub fn path(&self) -> &Path {
        &self.env_file
    }

    /// The key stored in the `.env` file, falling back to the process
    /// environment.
    pub fn load(&self) -> Option<String> {
        let from_file = dotenvy::from_path_iter(&self.env_file).ok().and_then(|iter| {
            iter.filter_map(Result::ok).find(|(key, _)| key == API_KEY_VAR).map(|(_, v)| v)
        });

        from_file
            .or_else(|| std::env::var(API_KEY_VAR).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Persist `key`, readable by the owner only.
    pub fn save(&self, key: &str) -> std::io::Result<()> {
        if let Some(parent) = self.env_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.env_file)?;

        // `mode` only applies to new files; tighten a pre-existing one before
        // the key lands in it.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(format!("{API_KEY_VAR}={key}\n").as_bytes())?;

        tracing::info!(path = %self.env_file.display(), "saved API key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn table(content: &str) -> toml::Table {
        content.parse().unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.commit_types().len(), 9);
        assert_eq!(config.commit_types()[0].tag, "IMP");
        assert_eq!(config.commit_format.type_format, "[%s]");
        assert_eq!(config.prompts.summary_prompt_max_diff_size, 20_000);
        assert_eq!(config.release.types, vec!["MAJOR", "MINOR", "PATCH", "HOTFIX"]);
        assert_eq!(config.release.max_commits, 100);
        assert_eq!(config.ui.theme, "default");
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string(&Config::default()).unwrap();
        assert!(toml_str.contains("[commit_format]"));
        assert!(toml_str.contains("[prompts]"));
        assert!(toml_str.contains("behavior = \"replace\""));
        assert!(!toml_str.contains("api_key"));
    }

    #[test]
    fn test_append_layer_extends_defaults() {
        let config = Config::from_layers(vec![table(
            r##"
            [commit_types]
            behavior = "append"
            types = [{ tag = "SEC", description = "Security fixes", color = "#ff0000" }]
            "##,
        )])
        .unwrap();

        let tags: Vec<_> = config.commit_types().iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags.len(), 10);
        assert_eq!(tags.last(), Some(&"SEC"));
        assert_eq!(config.commit_types()[9].color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_local_replace_wins_over_global_append() {
        let global = table(
            r#"
            [commit_types]
            behavior = "append"
            types = [{ tag = "SEC" }]
            "#,
        );
        let local = table(
            r#"
            [commit_types]
            behavior = "replace"
            types = [{ tag = "FEAT" }, { tag = "CHORE" }]
            "#,
        );

        let config = Config::from_layers(vec![global, local]).unwrap();
        let tags: Vec<_> = config.commit_types().iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["FEAT", "CHORE"]);
    }

    #[test]
    fn test_append_overrides_existing_tag_in_place() {
        let config = Config::from_layers(vec![table(
            r#"
            [commit_types]
            behavior = "append"
            types = [{ tag = "FIX", description = "Hotfixes" }]
            "#,
        )])
        .unwrap();

        assert_eq!(config.commit_types().len(), 9);
        assert_eq!(config.commit_types()[1].description, "Hotfixes");
    }

    #[test]
    fn test_later_layer_overrides_scalar_keys() {
        let global = table(
            r#"
            [commit_format]
            type_format = "(%s)"
            [prompts]
            summary_prompt_max_diff_size = 500
            "#,
        );
        let local = table(
            r#"
            [prompts]
            summary_prompt_max_diff_size = 900
            "#,
        );

        let config = Config::from_layers(vec![global, local]).unwrap();
        assert_eq!(config.commit_format.type_format, "(%s)");
        assert_eq!(config.prompts.summary_prompt_max_diff_size, 900);
        assert!(!config.prompts.summary_prompt.is_empty());
    }

    #[test]
    fn test_final_commit_message() {
        let config = Config::default();
        assert_eq!(config.final_commit_message("FIX", "src", "Handle nil"), "[FIX] src: Handle nil");
    }

    #[test]
    fn test_invalid_layer_reports_index() {
        let bad = table("[commit_types]\nbehavior = \"merge\"\n");
        let err = Config::from_layers(vec![table(""), bad]).unwrap_err();
        assert_eq!(err.0, 1);
    }

    #[test]
    #[serial]
    fn test_load_with_creates_global_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::in_dir(&dir.path().join("cfg"), dir.path());
        std::env::remove_var(API_KEY_VAR);

        let config = Config::load_with(&paths).unwrap();
        assert!(paths.global.exists());
        assert_eq!(config.commit_types().len(), 9);
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn test_load_with_malformed_local_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::in_dir(&dir.path().join("cfg"), dir.path());
        std::fs::write(&paths.local, "[commit_format\n").unwrap();

        match Config::load_with(&paths) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, paths.local),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_credential_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("commitcraft").join(".env"));
        std::env::remove_var(API_KEY_VAR);

        assert!(store.load().is_none());
        store.save("gsk_test").unwrap();
        assert_eq!(store.load().as_deref(), Some("gsk_test"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_credential_save_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "GROQ_API_KEY=old\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        CredentialStore::new(&path).save("gsk_new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "GROQ_API_KEY=gsk_new\n");
    }
}
