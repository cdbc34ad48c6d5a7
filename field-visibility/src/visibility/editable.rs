//! Field lists for edit surfaces.
//!
//! An edit form built from [`editable_fields`] never offers a field the
//! principal could not read, so a redacted placeholder can never be submitted
//! back over the real value.

use std::collections::BTreeSet;

use crate::{principal::Principal, record::Guarded, visibility::filter::decide};

/// Returns every field name of `record` except protected fields hidden from `principal`.
///
/// Uses the same decisions as [`crate::RecordFilter`]. Rule-set fields and
/// unprotected fields are always listed.
pub fn editable_fields<'r, T: Guarded>(
    record: &'r T,
    principal: &Principal,
) -> BTreeSet<&'r str> {
    let decisions = decide(record, principal);
    record
        .field_names()
        .into_iter()
        .filter(|field| decisions.is_visible(field))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::editable_fields;
    use crate::{Attributes, Principal, Record, RuleSet, Schema};

    #[test]
    fn hidden_fields_are_not_editable() {
        let schema = Arc::new(
            Schema::builder("profile")
                .protect("email", "visibility_email")
                .protect("phone", "visibility_phone")
                .build()
                .unwrap(),
        );
        let record: Record = Record::new(schema)
            .with_field("email", "a@example.com".to_owned())
            .with_field("phone", "555-0100".to_owned())
            .with_field("nickname", "al".to_owned())
            .with_rules("visibility_email", RuleSet::public())
            .with_rules("visibility_phone", RuleSet::new().with("all_is_staff"));

        let visitor = Principal::new("v", Attributes::new().with_flag("is_staff", false));
        let fields: Vec<&str> = editable_fields(&record, &visitor).into_iter().collect();
        assert_eq!(
            fields,
            vec!["email", "nickname", "visibility_email", "visibility_phone"]
        );
    }
}
