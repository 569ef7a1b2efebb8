//! Runtime plus-arguments forwarded from the command line to the model.
//!
//! Arguments of the form `+name` or `+name=value` are collected; anything
//! else is ignored so that the same argument vector can be handed over
//! unchanged. When a name appears more than once the first occurrence wins.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::SimError;

/// Parsed `+name[=value]` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlusArgs {
    entries: BTreeMap<String, Option<String>>,
}

impl PlusArgs {
    /// Collects plus-arguments from a raw argument list.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for arg in args {
            let Some(body) = arg.as_ref().strip_prefix('+') else {
                continue;
            };
            let (name, value) = match body.split_once('=') {
                Some((n, v)) => (n, Some(v.to_string())),
                None => (body, None),
            };
            if name.is_empty() {
                continue;
            }
            entries.entry(name.to_string()).or_insert(value);
        }
        Self { entries }
    }

    /// Returns true if `+name` or `+name=...` was given.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the raw value of `+name=value`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|v| v.as_deref())
    }

    /// Parses the value of `+name=value`.
    ///
    /// Returns `Ok(None)` when the argument is absent and an error when it is
    /// present without a value or with a value that does not parse.
    pub fn parse_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, SimError> {
        if !self.has(name) {
            return Ok(None);
        }
        let raw = self.value(name).ok_or_else(|| SimError::InvalidPlusArg {
            name: name.to_string(),
            reason: "missing value".to_string(),
        })?;
        raw.parse().map(Some).map_err(|_| SimError::InvalidPlusArg {
            name: name.to_string(),
            reason: format!("cannot parse '{raw}'"),
        })
    }

    /// Number of distinct plus-arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plus-arguments were given.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
