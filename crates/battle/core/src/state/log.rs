//! Structured, append-only battle log.
//!
//! Entries carry a translation key and interpolation parameters; formatting
//! is left to the presentation layer.

use std::collections::BTreeMap;

use super::ParticipantId;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum LogParam {
    Number(i64),
    Text(String),
}

impl From<&str> for LogParam {
    fn from(value: &str) -> Self {
        LogParam::Text(value.to_owned())
    }
}

impl From<String> for LogParam {
    fn from(value: String) -> Self {
        LogParam::Text(value)
    }
}

impl From<&ParticipantId> for LogParam {
    fn from(value: &ParticipantId) -> Self {
        LogParam::Text(value.0.clone())
    }
}

macro_rules! number_param {
    ($($ty:ty),+) => {
        $(impl From<$ty> for LogParam {
            fn from(value: $ty) -> Self {
                LogParam::Number(value as i64)
            }
        })+
    };
}

number_param!(i32, u32, u8, i64, usize);

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: BTreeMap<String, LogParam>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: Option<ParticipantId>,
}

impl LogEntry {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: BTreeMap::new(),
            source: None,
        }
    }

    pub fn source(mut self, source: &ParticipantId) -> Self {
        self.source = Some(source.clone());
        self
    }

    pub fn param(mut self, name: &str, value: impl Into<LogParam>) -> Self {
        self.params.insert(name.to_owned(), value.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BattleLog {
    entries: Vec<LogEntry>,
}

impl BattleLog {
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries appended after the first `start` entries.
    pub fn since(&self, start: usize) -> &[LogEntry] {
        self.entries.get(start..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }
}
