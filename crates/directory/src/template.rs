//! `%s` templates for bind DNs and search filters
//!
//! Only two escapes are meaningful: `%s` is the (escaped) identity and `%%`
//! is a literal percent sign. Any other `%` followed by a lowercase letter
//! expands to nothing. A `%` followed by anything else is kept as is.

use crate::escape::{escape_dn, escape_filter};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new("%[a-z%]").expect("valid placeholder regex"));

/// Expand a bind DN template for `identity`
pub fn bind_dn(template: &str, identity: &str) -> String {
    substitute(template, &escape_dn(identity))
}

/// Expand a search filter template for `identity`
pub fn search_filter(template: &str, identity: &str) -> String {
    substitute(template, &escape_filter(identity))
}

fn substitute(template: &str, value: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[0] {
            "%s" => value.to_string(),
            "%%" => "%".to_string(),
            _ => String::new(),
        })
        .into_owned()
}
