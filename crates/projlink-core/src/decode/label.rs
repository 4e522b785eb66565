//! Enumerated code lookups
//!
//! Projectors report settings as short numeric codes. A [`CodeTable`] maps
//! those codes onto a typed enum; codes missing from the table survive as
//! [`Coded::Unknown`] so the raw value is never lost.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DecodeError;

/// Human-readable name for a typed setting
pub trait CodeLabel: Copy + PartialEq + 'static {
    /// Label shown to users and written next to the tag in snapshots
    fn label(&self) -> &'static str;
}

/// Which part of the payload is the code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKey {
    /// The entire payload
    Whole,
    /// Only the first character; the rest is ignored
    FirstChar,
}

/// Static code -> value table
#[derive(Debug)]
pub struct CodeTable<T: 'static> {
    entries: &'static [(&'static str, T)],
    key: CodeKey,
}

impl<T: CodeLabel> CodeTable<T> {
    /// Table over `entries`, keyed on `key`
    pub const fn new(entries: &'static [(&'static str, T)], key: CodeKey) -> Self {
        Self { entries, key }
    }

    /// Look up the code carried by `payload`
    pub fn decode(&self, payload: &str) -> Result<Coded<T>, DecodeError> {
        let code = match self.key {
            CodeKey::Whole => payload,
            CodeKey::FirstChar => payload.get(..1).unwrap_or(payload),
        };
        if code.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(self.lookup(code))
    }

    /// Look up an already-extracted code
    pub fn lookup(&self, code: &str) -> Coded<T> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, value)| Coded::Known(*value))
            .unwrap_or_else(|| Coded::Unknown(code.to_string()))
    }

    /// Reverse lookup: the code this table uses for `value`
    pub fn code_for(&self, value: T) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(c, _)| *c)
    }
}

/// A decoded code: either a known setting or the raw code we did not recognise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coded<T> {
    /// Code found in the table
    Known(T),
    /// Raw code the table does not list
    Unknown(String),
}

impl<T: CodeLabel> Coded<T> {
    /// The typed value, if the code was recognised
    pub fn known(&self) -> Option<T> {
        match self {
            Coded::Known(value) => Some(*value),
            Coded::Unknown(_) => None,
        }
    }

    /// Display label; unknown codes render as `Unknown (<code>)`
    pub fn label(&self) -> String {
        match self {
            Coded::Known(value) => value.label().to_string(),
            Coded::Unknown(code) => format!("Unknown ({})", code),
        }
    }
}

impl<T: CodeLabel> fmt::Display for Coded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Persisted form of a [`Coded`] value.
///
/// `tag` is the stable enum name and is what restore logic matches on; the
/// label is for people reading the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labeled<T> {
    /// Typed value; `None` for an unrecognised code
    pub tag: Option<T>,
    /// Display label at capture time
    pub label: String,
}

impl<T: CodeLabel> From<Coded<T>> for Labeled<T> {
    fn from(coded: Coded<T>) -> Self {
        Self {
            tag: coded.known(),
            label: coded.label(),
        }
    }
}

impl<T: CodeLabel> Labeled<T> {
    /// Labeled form of a known value
    pub fn known(value: T) -> Self {
        Self {
            tag: Some(value),
            label: value.label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fruit {
        Apple,
        Pear,
    }

    impl CodeLabel for Fruit {
        fn label(&self) -> &'static str {
            match self {
                Fruit::Apple => "Apple",
                Fruit::Pear => "Pear",
            }
        }
    }

    const WHOLE: CodeTable<Fruit> =
        CodeTable::new(&[("1", Fruit::Apple), ("12", Fruit::Pear)], CodeKey::Whole);
    const FIRST: CodeTable<Fruit> =
        CodeTable::new(&[("1", Fruit::Apple), ("2", Fruit::Pear)], CodeKey::FirstChar);

    #[test]
    fn test_whole_payload_lookup() {
        assert_eq!(WHOLE.decode("1"), Ok(Coded::Known(Fruit::Apple)));
        assert_eq!(WHOLE.decode("12"), Ok(Coded::Known(Fruit::Pear)));
        assert_eq!(WHOLE.decode("13"), Ok(Coded::Unknown("13".into())));
    }

    #[test]
    fn test_first_char_lookup() {
        assert_eq!(FIRST.decode("2"), Ok(Coded::Known(Fruit::Pear)));
        assert_eq!(FIRST.decode("21"), Ok(Coded::Known(Fruit::Pear)));
        assert_eq!(FIRST.decode("9x"), Ok(Coded::Unknown("9".into())));
    }

    #[test]
    fn test_empty_payload_is_an_error() {
        assert_eq!(WHOLE.decode(""), Err(DecodeError::Empty));
        assert_eq!(FIRST.decode(""), Err(DecodeError::Empty));
    }

    #[test]
    fn test_unknown_label_carries_raw_code() {
        let coded = WHOLE.decode("70").unwrap();
        assert_eq!(coded.label(), "Unknown (70)");
        assert!(coded.label().contains("70"));
        assert_eq!(coded.known(), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(WHOLE.code_for(Fruit::Pear), Some("12"));
    }

    #[test]
    fn test_labeled_conversion() {
        let known: Labeled<Fruit> = Coded::Known(Fruit::Apple).into();
        assert_eq!(known, Labeled::known(Fruit::Apple));
        let unknown: Labeled<Fruit> = Coded::Unknown("5".into()).into();
        assert_eq!(unknown.tag, None);
        assert_eq!(unknown.label, "Unknown (5)");
    }
}
