//! Sentinel codes for non-substantive responses.
//!
//! Sentinel answer ids resolve to a fixed `(numeric, text)` pair under every
//! question and take precedence over the reference key.

use std::collections::HashMap;

/// Fixed resolution of a sentinel answer id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentinel {
    pub numeric: f64,
    pub text: &'static str,
}

/// `(answer_concept_id, numeric, text)` for every sentinel answer.
pub const SENTINEL_CODES: &[(i64, f64, &str)] = &[
    (903087, -999.0, "Don't Know"),
    (903096, -998.0, "Skip"),
    (903072, -997.0, "Does Not Apply To Me"),
    (903079, -996.0, "Prefer Not To Answer"),
    (903070, -995.0, "Other"),
    (903092, -994.0, "Not Sure"),
    (903095, -993.0, "None"),
    (903103, -992.0, "Unanswered"),
    (40192432, -991.0, "I am not religious"),
    (40192487, -990.0, "I do not believe in God (or a higher power)"),
    (40192520, -989.0, "Does not apply to my neighborhood"),
    (903081, -988.0, "Free Text"),
    (596889, 998.0, "Text"),
    (596883, -994.0, "Not Sure"),
    (1332844, -994.0, "Not Sure"),
    (903598, -996.0, "Prefer Not To Answer"),
    (903596, -996.0, "Prefer Not To Answer"),
    (903601, -996.0, "Prefer Not To Answer"),
    (903607, -996.0, "Prefer Not To Answer"),
    (903610, -996.0, "Prefer Not To Answer"),
    (903604, -996.0, "Prefer Not To Answer"),
    (43529089, -997.0, "No Blood Related Daughters"),
    (43529086, -997.0, "No Blood Related Siblings"),
    (43529092, -997.0, "No Blood Related Sons"),
    (43529090, -997.0, "No Daughters Related"),
];

/// Lookup table over [`SENTINEL_CODES`].
#[derive(Debug, Clone)]
pub struct SentinelTable {
    codes: HashMap<i64, Sentinel>,
}

impl SentinelTable {
    pub fn standard() -> Self {
        let codes = SENTINEL_CODES
            .iter()
            .map(|&(id, numeric, text)| (id, Sentinel { numeric, text }))
            .collect();
        Self { codes }
    }

    pub fn get(&self, answer_concept_id: i64) -> Option<Sentinel> {
        self.codes.get(&answer_concept_id).copied()
    }

    pub fn contains(&self, answer_concept_id: i64) -> bool {
        self.codes.contains_key(&answer_concept_id)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, Sentinel)> + '_ {
        self.codes.iter().map(|(id, sentinel)| (*id, *sentinel))
    }
}

impl Default for SentinelTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Numeric codes `-999..=-980` that stand for "coded missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingSentinelRange;

impl MissingSentinelRange {
    pub const MIN: i64 = -999;
    pub const MAX: i64 = -980;

    pub fn contains_i64(value: i64) -> bool {
        (Self::MIN..=Self::MAX).contains(&value)
    }

    /// Integral floats only; `-998.5` is a value, not a code.
    pub fn contains_f64(value: f64) -> bool {
        value.is_finite() && value.fract() == 0.0 && Self::contains_i64(value as i64)
    }

    /// Literal spellings a file loader should treat as missing.
    ///
    /// Both `-999` and `-999.0` forms are listed since exports write
    /// integer columns with nulls as floats.
    pub fn literals() -> Vec<String> {
        (Self::MIN..=Self::MAX)
            .flat_map(|code| [code.to_string(), format!("{code}.0")])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(MissingSentinelRange::contains_i64(-999));
        assert!(MissingSentinelRange::contains_i64(-980));
        assert!(!MissingSentinelRange::contains_i64(-979));
        assert!(!MissingSentinelRange::contains_i64(-1000));
        assert!(MissingSentinelRange::contains_f64(-990.0));
        assert!(!MissingSentinelRange::contains_f64(-990.5));
        assert!(!MissingSentinelRange::contains_f64(f64::NAN));
    }

    #[test]
    fn literals_cover_both_spellings() {
        let literals = MissingSentinelRange::literals();
        assert_eq!(literals.len(), 40);
        assert!(literals.contains(&"-999".to_string()));
        assert!(literals.contains(&"-980.0".to_string()));
    }
}
