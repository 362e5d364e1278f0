//! HTTP status/message table for the five fixed outcome kinds

use authgate_core::{Error, Result};
use serde::Deserialize;

/// Outcome kinds that render a status and a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Ok,
    Unauth,
    Forbidden,
    NoPath,
    NoUser,
}

/// One entry as written in the config file; unset fields take defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusEntry {
    #[serde(default, alias = "Code")]
    pub code: Option<u16>,
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

/// The `response` section of the config file.
///
/// Capitalised keys from older configs are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusTable {
    #[serde(default, alias = "Ok")]
    pub ok: StatusEntry,
    #[serde(default, alias = "Unauth")]
    pub unauth: StatusEntry,
    #[serde(default, alias = "Forbidden")]
    pub forbidden: StatusEntry,
    #[serde(default, alias = "Nopath", alias = "NoPath")]
    pub nopath: StatusEntry,
    #[serde(default, alias = "Nouser", alias = "NoUser")]
    pub nouser: StatusEntry,
}

/// A resolved status code and body message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    pub code: u16,
    pub message: String,
}

/// Status table with defaults applied and codes validated
#[derive(Debug, Clone)]
pub struct ResponseTable {
    ok: StatusReply,
    unauth: StatusReply,
    forbidden: StatusReply,
    nopath: StatusReply,
    nouser: StatusReply,
}

impl ResponseTable {
    /// Apply defaults and check every code lies in [100, 600)
    pub fn resolve(table: &StatusTable) -> Result<Self> {
        Ok(Self {
            ok: resolve_entry(ReplyKind::Ok, &table.ok)?,
            unauth: resolve_entry(ReplyKind::Unauth, &table.unauth)?,
            forbidden: resolve_entry(ReplyKind::Forbidden, &table.forbidden)?,
            nopath: resolve_entry(ReplyKind::NoPath, &table.nopath)?,
            nouser: resolve_entry(ReplyKind::NoUser, &table.nouser)?,
        })
    }

    pub fn get(&self, kind: ReplyKind) -> &StatusReply {
        match kind {
            ReplyKind::Ok => &self.ok,
            ReplyKind::Unauth => &self.unauth,
            ReplyKind::Forbidden => &self.forbidden,
            ReplyKind::NoPath => &self.nopath,
            ReplyKind::NoUser => &self.nouser,
        }
    }
}

impl Default for ResponseTable {
    fn default() -> Self {
        let reply = |kind| {
            let (code, message) = default_reply(kind);
            StatusReply {
                code,
                message: message.to_string(),
            }
        };
        Self {
            ok: reply(ReplyKind::Ok),
            unauth: reply(ReplyKind::Unauth),
            forbidden: reply(ReplyKind::Forbidden),
            nopath: reply(ReplyKind::NoPath),
            nouser: reply(ReplyKind::NoUser),
        }
    }
}

impl ReplyKind {
    /// Key of this kind in the `response` section
    pub fn key(self) -> &'static str {
        match self {
            ReplyKind::Ok => "ok",
            ReplyKind::Unauth => "unauth",
            ReplyKind::Forbidden => "forbidden",
            ReplyKind::NoPath => "nopath",
            ReplyKind::NoUser => "nouser",
        }
    }
}

fn default_reply(kind: ReplyKind) -> (u16, &'static str) {
    match kind {
        ReplyKind::Ok => (200, "Authorized"),
        ReplyKind::Unauth => (401, "Not authenticated"),
        ReplyKind::Forbidden => (403, "Forbidden"),
        ReplyKind::NoPath => (403, "No path header"),
        ReplyKind::NoUser => (403, "No user header"),
    }
}

fn resolve_entry(kind: ReplyKind, entry: &StatusEntry) -> Result<StatusReply> {
    let (default_code, default_message) = default_reply(kind);

    // A zero code means "unset", same as an absent one
    let code = entry.code.filter(|c| *c != 0).unwrap_or(default_code);
    if !(100..600).contains(&code) {
        return Err(Error::configuration(format!(
            "response.{}.code {code} is outside 100..600",
            kind.key()
        )));
    }

    let message = entry
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_message.to_string());

    Ok(StatusReply { code, message })
}
