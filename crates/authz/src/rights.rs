//! User-rights table

use authgate_config::load_file;
use authgate_core::{Error, Result, RIGHT_ANY, RIGHT_NONE};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Answers "does this identity hold this right label?"
pub trait UserRights: Send + Sync {
    fn check_right(&self, label: &str, identity: &str) -> bool;

    /// Whether `label` is known at all
    fn validate_label(&self, label: &str) -> bool;
}

/// Label to member list, loaded from a JSON, YAML or TOML file.
///
/// `any` grants every identity and `none` grants nobody; neither may be
/// redefined in the file.
///
/// ```toml
/// reader = ["alice", "bob"]
/// editor = ["alice"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RightsTable {
    labels: HashMap<String, HashSet<String>>,
}

impl RightsTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let table: RightsTable = load_file(path.as_ref())?;
        table.check_builtins()?;
        tracing::debug!(
            path = %path.as_ref().display(),
            labels = table.labels.len(),
            "loaded rights table"
        );
        Ok(table)
    }

    pub fn from_entries<L, I, M>(entries: I) -> Result<Self>
    where
        L: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
        I: IntoIterator<Item = (L, M)>,
    {
        let labels: HashMap<String, HashSet<String>> = entries
            .into_iter()
            .map(|(label, members)| {
                let members: HashSet<String> = members.into_iter().map(Into::into).collect();
                (label.into(), members)
            })
            .collect();
        let table = Self { labels };
        table.check_builtins()?;
        Ok(table)
    }

    fn check_builtins(&self) -> Result<()> {
        for builtin in [RIGHT_ANY, RIGHT_NONE] {
            if self.labels.contains_key(builtin) {
                return Err(Error::configuration(format!(
                    "rights table must not define the built-in label '{builtin}'"
                )));
            }
        }
        Ok(())
    }
}

impl UserRights for RightsTable {
    fn check_right(&self, label: &str, identity: &str) -> bool {
        match label {
            RIGHT_ANY => true,
            RIGHT_NONE => false,
            _ => self
                .labels
                .get(label)
                .is_some_and(|members| members.contains(identity)),
        }
    }

    fn validate_label(&self, label: &str) -> bool {
        label == RIGHT_ANY || label == RIGHT_NONE || self.labels.contains_key(label)
    }
}
