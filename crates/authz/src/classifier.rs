use authgate_core::{Classification, Error, Result};
use regex::Regex;

/// Classifies request paths with one configured pattern.
///
/// The pattern must have exactly one capture group; its text is the policy
/// id. Without a pattern every path is `Unmatched`. Every consumer in a
/// request (authentication, authorization, cache tag) uses the same
/// classifier value, so they always agree.
#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    pattern: Option<Regex>,
}

impl PathClassifier {
    /// Compile `pattern`; `None` or an empty string leaves it unconfigured
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let Some(source) = pattern.filter(|p| !p.is_empty()) else {
            return Ok(Self::default());
        };

        let regex = Regex::new(source).map_err(|e| Error::pattern(source, e.to_string()))?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(Error::pattern(
                source,
                format!("expected exactly one capture group, found {groups}"),
            ));
        }

        Ok(Self {
            pattern: Some(regex),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// Classify one path. Pure: the same path always gives the same answer.
    pub fn classify(&self, path: &str) -> Classification {
        let Some(regex) = &self.pattern else {
            return Classification::Unmatched;
        };

        match regex.captures(path) {
            // A group that did not take part in the match captures ""
            Some(caps) => Classification::matched(caps.get(1).map_or("", |m| m.as_str())),
            None => Classification::Unmatched,
        }
    }
}
