//! The visibility evaluator.
//!
//! Evaluation is a pure function of a rule set, the principal's attributes,
//! and the owner's attributes. Rules are OR'ed together and an empty rule set
//! hides its field. Missing information never grants visibility: an
//! unresolved flag satisfies neither `all_<attr>` nor `all_not_<attr>`, an
//! unresolved relation is an empty group set, and `share_*` rules need an owner.

use crate::{
    principal::AttributeSource,
    rules::{Rule, RuleSet},
};

/// The outcome of evaluating one rule set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict<'a> {
    /// Visible; carries the first rule that granted visibility.
    Visible(Rule<'a>),
    /// Not visible.
    Hidden,
}

impl Verdict<'_> {
    pub fn is_visible(&self) -> bool {
        matches!(self, Verdict::Visible(_))
    }
}

/// Returns whether a field guarded by `rules` is visible to `principal`.
///
/// `owner` is the record owner used by `share_*` rules; pass `None` when the
/// record has no owner.
pub fn is_visible(
    rules: Option<&RuleSet>,
    principal: &dyn AttributeSource,
    owner: Option<&dyn AttributeSource>,
) -> bool {
    evaluate(rules, principal, owner).is_visible()
}

/// Evaluates `rules` and reports which rule, if any, granted visibility.
///
/// Rules are checked kind by kind (`all`, then `all_<attr>`, then
/// `all_not_<attr>`, then `share_<attr>`), each kind in flag order. The
/// verdict does not depend on that order; only the reported rule does.
pub fn evaluate<'r>(
    rules: Option<&'r RuleSet>,
    principal: &dyn AttributeSource,
    owner: Option<&dyn AttributeSource>,
) -> Verdict<'r> {
    let Some(rules) = rules.filter(|rules| !rules.is_empty()) else {
        return Verdict::Hidden;
    };

    let parsed: Vec<Rule<'r>> = rules.rules().collect();
    if parsed.contains(&Rule::All) {
        return Verdict::Visible(Rule::All);
    }

    let granted = parsed
        .iter()
        .copied()
        .filter(|rule| matches!(rule, Rule::AllWhere(_)))
        .chain(
            parsed
                .iter()
                .copied()
                .filter(|rule| matches!(rule, Rule::AllWhereNot(_))),
        )
        .chain(
            parsed
                .iter()
                .copied()
                .filter(|rule| matches!(rule, Rule::Share(_))),
        )
        .find(|rule| grants(*rule, principal, owner));

    granted.map_or(Verdict::Hidden, Verdict::Visible)
}

fn grants(
    rule: Rule<'_>,
    principal: &dyn AttributeSource,
    owner: Option<&dyn AttributeSource>,
) -> bool {
    match rule {
        Rule::All => true,
        Rule::AllWhere(attr) => principal.flag(attr) == Some(true),
        Rule::AllWhereNot(attr) => principal.flag(attr) == Some(false),
        Rule::Share(attr) => {
            let Some(owner) = owner else {
                return false;
            };
            let (Some(mine), Some(theirs)) = (principal.groups(attr), owner.groups(attr)) else {
                return false;
            };
            !mine.is_disjoint(&theirs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate, is_visible, Verdict};
    use crate::{
        principal::{AttributeSource, Attributes, Principal},
        rules::{Rule, RuleSet},
    };

    fn rules(flags: &[&str]) -> RuleSet {
        flags.iter().copied().collect()
    }

    fn staff(is_staff: bool) -> Principal {
        Principal::new("staff", Attributes::new().with_flag("is_staff", is_staff))
    }

    #[test]
    fn absent_or_empty_rules_hide() {
        let principal = staff(true);
        assert!(!is_visible(None, &principal, None));
        assert!(!is_visible(Some(&RuleSet::new()), &principal, Some(&principal)));
    }

    #[test]
    fn unrecognized_flags_alone_hide() {
        let principal = staff(true);
        assert!(!is_visible(Some(&rules(&["featured"])), &principal, None));
    }

    #[test]
    fn all_grants_and_is_reported() {
        let set = rules(&["all", "all_is_staff"]);
        let verdict = evaluate(Some(&set), &staff(false), None);
        assert_eq!(verdict, Verdict::Visible(Rule::All));
    }

    #[test]
    fn all_attr_follows_flag() {
        let set = rules(&["all_is_staff"]);
        assert!(is_visible(Some(&set), &staff(true), None));
        assert!(!is_visible(Some(&set), &staff(false), None));
        assert!(!is_visible(Some(&set), &Principal::anonymous(), None));
    }

    #[test]
    fn all_not_attr_needs_resolved_false() {
        let set = rules(&["all_not_is_staff"]);
        assert!(is_visible(Some(&set), &staff(false), None));
        assert!(!is_visible(Some(&set), &staff(true), None));
        assert!(!is_visible(Some(&set), &Principal::anonymous(), None));
    }

    #[test]
    fn share_needs_owner_and_overlap() {
        let set = rules(&["share_leagues"]);
        let viewer = Principal::new("v", Attributes::new().with_groups("leagues", ["a", "b"]));
        let owner = Attributes::new().with_groups("leagues", ["b", "c"]);
        let stranger = Attributes::new().with_groups("leagues", ["c"]);

        assert!(is_visible(Some(&set), &viewer, Some(&owner)));
        assert!(!is_visible(Some(&set), &viewer, Some(&stranger)));
        assert!(!is_visible(Some(&set), &viewer, None));
        assert!(!is_visible(Some(&set), &viewer, Some(&Attributes::new())));
    }

    #[test]
    fn owner_viewing_own_record_is_not_special() {
        let owner = Principal::new(
            "o",
            Attributes::new().with_groups("leagues", Vec::<String>::new()),
        );
        let set = rules(&["share_leagues"]);
        assert!(!is_visible(Some(&set), &owner, Some(&owner as &dyn AttributeSource)));
    }

    #[test]
    fn reports_first_granting_rule_by_kind() {
        let principal = Principal::new(
            "p",
            Attributes::new()
                .with_flag("is_staff", true)
                .with_flag("is_registrar", false),
        );
        let set = rules(&["all_not_is_registrar", "all_is_staff"]);
        let verdict = evaluate(Some(&set), &principal, None);
        assert_eq!(verdict, Verdict::Visible(Rule::AllWhere("is_staff")));
    }
}
