//! Rule sets: the named flags attached to one protected field.
//!
//! A rule set is a plain set of flag names. Only four flag shapes carry
//! meaning for visibility (see [`Rule`]); every other flag is kept but ignored,
//! so schema authors can store unrelated flags in the same bitset.

use std::{
    borrow::Cow,
    collections::{btree_set, BTreeSet},
    fmt,
};

use crate::error::VisibilityError;

/// The flag that makes a field visible to everyone.
pub const ALL: &str = "all";

const ALL_NOT_PREFIX: &str = "all_not_";
const ALL_PREFIX: &str = "all_";
const SHARE_PREFIX: &str = "share_";

/// A recognized visibility rule, parsed from a flag name.
///
/// The attribute name is borrowed from the flag it was parsed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule<'a> {
    /// `all`: visible to every principal.
    All,
    /// `all_<attr>`: visible when the principal's flag `<attr>` is `true`.
    AllWhere(&'a str),
    /// `all_not_<attr>`: visible when the principal's flag `<attr>` is `false`.
    AllWhereNot(&'a str),
    /// `share_<attr>`: visible when principal and owner share a group under `<attr>`.
    Share(&'a str),
}

impl<'a> Rule<'a> {
    /// Parses a flag name into a rule.
    ///
    /// Returns `None` for flags that are not visibility rules, including
    /// prefixed flags with an empty attribute name (`all_`, `share_`).
    /// `all_not_` is matched before `all_`, so `all_not_x` never reads as
    /// `all_<not_x>`.
    pub fn parse(flag: &'a str) -> Option<Self> {
        if flag == ALL {
            return Some(Rule::All);
        }
        let non_empty = |attr: &'a str| (!attr.is_empty()).then_some(attr);
        if let Some(attr) = flag.strip_prefix(ALL_NOT_PREFIX) {
            return non_empty(attr).map(Rule::AllWhereNot);
        }
        if let Some(attr) = flag.strip_prefix(ALL_PREFIX) {
            return non_empty(attr).map(Rule::AllWhere);
        }
        if let Some(attr) = flag.strip_prefix(SHARE_PREFIX) {
            return non_empty(attr).map(Rule::Share);
        }
        None
    }
}

impl fmt::Display for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::All => f.write_str(ALL),
            Rule::AllWhere(attr) => write!(f, "{ALL_PREFIX}{attr}"),
            Rule::AllWhereNot(attr) => write!(f, "{ALL_NOT_PREFIX}{attr}"),
            Rule::Share(attr) => write!(f, "{SHARE_PREFIX}{attr}"),
        }
    }
}

/// The set of flags that are set on one protected field.
///
/// Flags are kept in sorted order, so enumeration is stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RuleSet {
    flags: BTreeSet<String>,
}

impl RuleSet {
    /// Constructs an empty rule set. An empty rule set hides its field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs the rule set `{all}`.
    #[must_use]
    pub fn public() -> Self {
        std::iter::once(ALL).collect()
    }

    /// Sets a flag.
    pub fn insert<S: Into<String>>(&mut self, flag: S) {
        self.flags.insert(flag.into());
    }

    /// Sets a flag, builder style.
    #[must_use]
    pub fn with<S: Into<String>>(mut self, flag: S) -> Self {
        self.insert(flag);
        self
    }

    /// Returns whether flag `name` is set.
    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Enumerates every set flag, recognized or not.
    pub fn flags(&self) -> impl Iterator<Item = &str> + '_ {
        self.flags.iter().map(String::as_str)
    }

    /// Enumerates the set flags that parse as visibility rules.
    pub fn rules(&self) -> impl Iterator<Item = Rule<'_>> + '_ {
        self.flags().filter_map(Rule::parse)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }
}

impl<S: Into<String>> FromIterator<S> for RuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.iter()
    }
}

/// The ordered flag names behind a bitset column.
///
/// Bit `n` of a [`RuleBits`] value corresponds to `names[n]`. Vocabularies are
/// usually declared as `static` items next to the schema that uses them:
///
/// ```rust
/// use field_visibility::{RuleBits, RuleVocabulary};
///
/// static PROFILE_RULES: RuleVocabulary =
///     RuleVocabulary::new(&["all", "all_is_staff", "share_leagues"]);
///
/// let bits = RuleBits::new(0b100, &PROFILE_RULES);
/// assert!(bits.decode("visibility_email").unwrap().contains("share_leagues"));
/// ```
#[derive(Debug)]
pub struct RuleVocabulary {
    names: &'static [&'static str],
}

impl RuleVocabulary {
    /// Declares a vocabulary. At most 64 names are addressable.
    #[must_use]
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// Returns the bit mask for `flag`, or `None` if it is not in the vocabulary.
    pub fn bit(&self, flag: &str) -> Option<u64> {
        self.names
            .iter()
            .take(64)
            .position(|name| *name == flag)
            .map(|index| 1_u64 << index)
    }

    /// Decodes a bitset into the flags it sets.
    ///
    /// `field` names the rule-set field for the error, which is returned when
    /// `bits` sets a bit that has no name in this vocabulary.
    pub fn decode(&self, field: &str, bits: u64) -> Result<RuleSet, VisibilityError> {
        let known = self.names.len().min(64);
        let known_mask = if known == 64 {
            u64::MAX
        } else {
            (1_u64 << known) - 1
        };
        if bits & !known_mask != 0 {
            return Err(VisibilityError::UnreadableRuleSet {
                field: field.to_owned(),
                bits,
            });
        }
        Ok(self
            .names
            .iter()
            .take(known)
            .enumerate()
            .filter(|(index, _)| bits & (1_u64 << index) != 0)
            .map(|(_, name)| *name)
            .collect())
    }
}

/// A rule set stored as a bitset over a [`RuleVocabulary`].
#[derive(Clone, Copy, Debug)]
pub struct RuleBits {
    bits: u64,
    vocabulary: &'static RuleVocabulary,
}

impl RuleBits {
    #[must_use]
    pub const fn new(bits: u64, vocabulary: &'static RuleVocabulary) -> Self {
        Self { bits, vocabulary }
    }

    /// Builds the bitset for a list of flags. Flags outside the vocabulary are skipped.
    #[must_use]
    pub fn from_flags(flags: &[&str], vocabulary: &'static RuleVocabulary) -> Self {
        let bits = flags
            .iter()
            .filter_map(|flag| vocabulary.bit(flag))
            .fold(0, |acc, bit| acc | bit);
        Self { bits, vocabulary }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Decodes the bitset. `field` names the rule-set field in the error.
    /// See [`RuleVocabulary::decode`].
    pub fn decode(&self, field: &str) -> Result<RuleSet, VisibilityError> {
        self.vocabulary.decode(field, self.bits)
    }
}

/// Field types that can hold a rule set.
///
/// The filter reads a protected field's rules through this trait. Reading may
/// fail for encoded representations; the caller attributes the failure to the
/// rule-set field and hides the protected field.
pub trait AsRuleSet {
    /// Reads the rule set. `field` is the rule-set field's name, used in errors.
    fn as_rule_set(&self, field: &str) -> Result<Cow<'_, RuleSet>, VisibilityError>;
}

impl AsRuleSet for RuleSet {
    fn as_rule_set(&self, _field: &str) -> Result<Cow<'_, RuleSet>, VisibilityError> {
        Ok(Cow::Borrowed(self))
    }
}

impl AsRuleSet for Option<RuleSet> {
    fn as_rule_set(&self, _field: &str) -> Result<Cow<'_, RuleSet>, VisibilityError> {
        Ok(self
            .as_ref()
            .map_or_else(|| Cow::Owned(RuleSet::new()), Cow::Borrowed))
    }
}

impl AsRuleSet for RuleBits {
    fn as_rule_set(&self, field: &str) -> Result<Cow<'_, RuleSet>, VisibilityError> {
        self.decode(field).map(Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::{AsRuleSet, Rule, RuleBits, RuleSet, RuleVocabulary};
    use crate::VisibilityError;

    static VOCABULARY: RuleVocabulary =
        RuleVocabulary::new(&["all", "all_is_staff", "all_not_is_registrar", "share_leagues"]);

    #[test]
    fn parses_the_four_rule_kinds() {
        assert_eq!(Rule::parse("all"), Some(Rule::All));
        assert_eq!(Rule::parse("all_is_staff"), Some(Rule::AllWhere("is_staff")));
        assert_eq!(
            Rule::parse("all_not_is_registrar"),
            Some(Rule::AllWhereNot("is_registrar"))
        );
        assert_eq!(Rule::parse("share_leagues"), Some(Rule::Share("leagues")));
    }

    #[test]
    fn unrecognized_flags_are_not_rules() {
        assert_eq!(Rule::parse("featured"), None);
        assert_eq!(Rule::parse("allow_comments"), None);
        assert_eq!(Rule::parse("all_"), None);
        assert_eq!(Rule::parse("all_not_"), None);
        assert_eq!(Rule::parse("share_"), None);
        assert_eq!(Rule::parse(""), None);
    }

    #[test]
    fn rule_display_round_trips_flag_name() {
        for flag in ["all", "all_is_staff", "all_not_is_registrar", "share_leagues"] {
            assert_eq!(Rule::parse(flag).unwrap().to_string(), flag);
        }
    }

    #[test]
    fn rule_set_enumerates_flags_in_sorted_order() {
        let rules: RuleSet = ["share_leagues", "featured", "all"].into_iter().collect();
        assert_eq!(
            rules.flags().collect::<Vec<_>>(),
            vec!["all", "featured", "share_leagues"]
        );
        assert_eq!(
            rules.rules().collect::<Vec<_>>(),
            vec![Rule::All, Rule::Share("leagues")]
        );
        assert!(rules.contains("featured"));
        assert!(!rules.contains("all_is_staff"));
    }

    #[test]
    fn bits_decode_against_vocabulary() {
        let bits = RuleBits::new(0b1010, &VOCABULARY);
        let rules = bits.decode("visibility_email").unwrap();
        assert_eq!(
            rules.flags().collect::<Vec<_>>(),
            vec!["all_is_staff", "share_leagues"]
        );
    }

    #[test]
    fn from_flags_sets_matching_bits() {
        let bits = RuleBits::from_flags(&["all", "share_leagues", "unknown"], &VOCABULARY);
        assert_eq!(bits.bits(), 0b1001);
    }

    #[test]
    fn bits_outside_vocabulary_are_unreadable() {
        let bits = RuleBits::new(0b1_0000, &VOCABULARY);
        let err = bits.as_rule_set("visibility_email").unwrap_err();
        match err {
            VisibilityError::UnreadableRuleSet { field, bits } => {
                assert_eq!(field, "visibility_email");
                assert_eq!(bits, 0b1_0000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_errors_name_the_rule_set_field() {
        let bits = RuleBits::new(1 << 20, &VOCABULARY);
        assert_eq!(
            bits.decode("visibility_phone"),
            Err(VisibilityError::UnreadableRuleSet {
                field: "visibility_phone".to_owned(),
                bits: 1 << 20,
            })
        );
    }

    #[test]
    fn missing_optional_rule_set_reads_as_empty() {
        let rules: Option<RuleSet> = None;
        assert!(rules.as_rule_set("visibility_x").unwrap().is_empty());
    }
}
