//! Classification to policy
//!
//! Two strategies, one per process: a static right label checked against
//! the rights table, or a directory search filter run after the bind.

use crate::rights::UserRights;
use authgate_config::{FilterSection, RightSection};
use authgate_core::{Classification, Error, Result};
use std::collections::HashMap;

/// Path class to right label
#[derive(Debug, Clone)]
pub struct RightLabelPolicy {
    nomatch_right: String,
    default_right: String,
    path_right: HashMap<String, String>,
}

impl RightLabelPolicy {
    pub fn new(
        nomatch_right: impl Into<String>,
        default_right: impl Into<String>,
        path_right: HashMap<String, String>,
    ) -> Self {
        Self {
            nomatch_right: nomatch_right.into(),
            default_right: default_right.into(),
            path_right,
        }
    }

    pub fn from_section(section: &RightSection) -> Self {
        Self::new(
            section.nomatch_right.clone(),
            section.default_right.clone(),
            section.path_right.clone(),
        )
    }

    /// Every label this policy can return must exist in `rights`
    pub fn validate(&self, rights: &dyn UserRights) -> Result<()> {
        let fixed = [
            ("nomatch_right", &self.nomatch_right),
            ("default_right", &self.default_right),
        ];
        for (key, label) in fixed {
            if !rights.validate_label(label) {
                return Err(Error::configuration(format!("{key} '{label}' is not a known right")));
            }
        }

        let mut ids: Vec<_> = self.path_right.keys().collect();
        ids.sort();
        for id in ids {
            let label = &self.path_right[id];
            if !rights.validate_label(label) {
                return Err(Error::configuration(format!(
                    "path_right '{id}' uses unknown right '{label}'"
                )));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, class: &Classification) -> &str {
        match class {
            Classification::Unmatched => &self.nomatch_right,
            Classification::Matched(id) => self
                .path_right
                .get(id.as_str())
                .unwrap_or(&self.default_right),
        }
    }
}

/// Result of resolving a path class to a directory filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDecision<'a> {
    /// `false` means the class is banned: deny regardless of identity
    pub permitted: bool,
    pub filter: &'a str,
}

impl<'a> FilterDecision<'a> {
    /// Filter to search with; banned classes never search
    pub fn search_filter(&self) -> Option<&'a str> {
        if self.permitted && !self.filter.is_empty() {
            Some(self.filter)
        } else {
            None
        }
    }
}

/// Path class to directory search filter
#[derive(Debug, Clone, Default)]
pub struct DirectoryFilterPolicy {
    ban_nomatch: bool,
    nomatch_filter: String,
    ban_default: bool,
    default_filter: String,
    path_filter: HashMap<String, String>,
}

impl DirectoryFilterPolicy {
    pub fn from_section(section: &FilterSection) -> Self {
        Self {
            ban_nomatch: section.ban_nomatch,
            nomatch_filter: section.nomatch_filter.clone(),
            ban_default: section.ban_default,
            default_filter: section.default_filter.clone(),
            path_filter: section.path_filter.clone(),
        }
    }

    pub fn resolve(&self, class: &Classification) -> FilterDecision<'_> {
        match class {
            Classification::Unmatched => FilterDecision {
                permitted: !self.ban_nomatch,
                filter: &self.nomatch_filter,
            },
            Classification::Matched(id) => match self.path_filter.get(id.as_str()) {
                Some(filter) => FilterDecision {
                    permitted: true,
                    filter,
                },
                None => FilterDecision {
                    permitted: !self.ban_default,
                    filter: &self.default_filter,
                },
            },
        }
    }
}
