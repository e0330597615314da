//! Scheduler flag map and the free-form option-string parser.

use std::collections::BTreeMap;
use std::fmt;

/// Raised when the extra-options string is malformed.
///
/// Always fatal to the current invocation; the message echoes the
/// offending input so the user can spot the typo.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Scheduler options must start with a flag or the SL6 preset: \"{0}\"")]
    LeadingToken(String),

    #[error("Expected a flag, found bare token \"{0}\"")]
    BareToken(String),
}

/// The SL6 preset expands to these two flag assignments.
const SL6_FLAGS: [(&str, &str); 2] = [("-P", "SL6"), ("-q", "low6.q")];

/// An ordered mapping from scheduler flag (`-l`, `-pe`, ...) to its value.
///
/// `-l` is cumulative: segments appended via [`FlagMap::append_l`] are
/// comma-joined with no leading comma and no empty segments. Every other
/// flag is last-write-wins.
///
/// Built once per invocation from the option string and the resource
/// parameters, then handed to the submission step unchanged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlagMap(BTreeMap<String, String>);

enum State {
    AwaitingFlag,
    AccumulatingValue,
}

impl FlagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a free-form string of extra scheduler options.
    ///
    /// Tokens are whitespace-separated. A dash-prefixed token opens a flag;
    /// the non-dash tokens after it are concatenated (no separator) into its
    /// value, so `-l a=1` and `-l a=1,b=2` both work while a bare flag gets
    /// the empty value. The `SL6` preset token (case-insensitive) expands in
    /// place to `-P SL6 -q low6.q`. Anything else where a flag is expected
    /// is a [`ParseError`].
    pub fn parse(raw: &str) -> Result<FlagMap, ParseError> {
        let raw = raw.trim();
        let mut flags = FlagMap::new();
        if raw.is_empty() {
            return Ok(flags);
        }

        let mut state = State::AwaitingFlag;
        let mut flag = String::new();
        let mut value = String::new();
        for (i, token) in raw.split_whitespace().enumerate() {
            match state {
                State::AwaitingFlag => {
                    if token.eq_ignore_ascii_case("SL6") {
                        for (f, v) in SL6_FLAGS {
                            flags.insert(f, v);
                        }
                    } else if token.starts_with('-') {
                        flag = token.to_string();
                        value.clear();
                        state = State::AccumulatingValue;
                    } else if i == 0 {
                        return Err(ParseError::LeadingToken(raw.to_string()));
                    } else {
                        return Err(ParseError::BareToken(token.to_string()));
                    }
                }
                State::AccumulatingValue => {
                    if token.starts_with('-') {
                        flags.insert(&flag, &value);
                        flag = token.to_string();
                        value.clear();
                    } else {
                        value.push_str(token);
                    }
                }
            }
        }
        if let State::AccumulatingValue = state {
            flags.insert(&flag, &value);
        }
        Ok(flags)
    }

    /// Set a flag, overwriting any previous value.
    pub fn insert(&mut self, flag: &str, value: &str) {
        self.0.insert(flag.to_string(), value.to_string());
    }

    /// Append a segment to the cumulative `-l` resource list.
    ///
    /// Creates the entry when absent; never leaves a leading comma or an
    /// empty segment behind.
    pub fn append_l(&mut self, segment: &str) {
        let segment = segment.trim_matches(',');
        if segment.is_empty() {
            return;
        }
        let entry = self.0.entry("-l".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(',');
        }
        entry.push_str(segment);
    }

    pub fn get(&self, flag: &str) -> Option<&str> {
        self.0.get(flag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Flags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Canonical re-serialization: flag and value, space-joined.
    ///
    /// For simple (non-preset) input, parsing this string again yields an
    /// equal map.
    pub fn to_option_string(&self) -> String {
        let mut out = String::new();
        for (flag, value) in self.iter() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(flag);
            if !value.is_empty() {
                out.push(' ');
                out.push_str(value);
            }
        }
        out
    }
}

impl fmt::Display for FlagMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_option_string())
    }
}
