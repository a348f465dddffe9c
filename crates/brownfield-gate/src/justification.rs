use brownfield_utils::atomic_write::read_if_exists;
use brownfield_utils::error::{BrownfieldError, ConfigError};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// A human-accepted complexity violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityJustification {
    pub file: String,
    pub function: String,
    pub reason: String,
}

/// Contents of the complexity justification artifact: a JSON array of
/// `{file, function, reason}` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplexityJustifications {
    entries: Vec<ComplexityJustification>,
}

impl ComplexityJustifications {
    #[must_use]
    pub fn new(entries: Vec<ComplexityJustification>) -> Self {
        Self { entries }
    }

    /// Load the artifact; a missing file means no justifications.
    pub fn load(path: &Utf8Path) -> Result<Self, BrownfieldError> {
        let Some(content) = read_if_exists(path)? else {
            return Ok(Self::default());
        };
        serde_json::from_str(&content).map_err(|e| {
            ConfigError::InvalidFile(format!("{path}: {e}")).into()
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The justification for `file::function`, if recorded.
    #[must_use]
    pub fn find(&self, file: &str, function: &str) -> Option<&ComplexityJustification> {
        self.entries
            .iter()
            .find(|entry| entry.file == file && entry.function == function)
    }

    /// Look up an exception key of the form `file::function`.
    ///
    /// The key splits at the first `::`; the function part may itself be a
    /// qualified path such as `Type::method`.
    #[must_use]
    pub fn find_key(&self, key: &str) -> Option<&ComplexityJustification> {
        let (file, function) = key.split_once("::")?;
        self.find(file, function)
    }
}
