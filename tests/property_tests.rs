//! Property tests for the diff engine
//!
//! Exercised through the real `Book` declaration so field order, the
//! identifier exclusion and `Price` masking all come from the model.

use change_audit::audit::{
    diff_snapshots, Capability, CapabilityRegistry, ChangeSet, Entity, SensitivityPolicy,
    DEFAULT_REDACTION_TOKEN,
};
use change_audit::models::{Book, BookId, Money};
use proptest::prelude::*;

fn registry() -> CapabilityRegistry {
    CapabilityRegistry::builder(SensitivityPolicy::PerFieldMasking)
        .register::<Book>()
        .build()
        .unwrap()
}

fn book_capability(registry: &CapabilityRegistry) -> &Capability {
    registry.capability("Book").unwrap()
}

// Strategy: a book whose text fields never contain digits, so a rendered
// price cannot show up in them by accident
fn arb_book() -> impl Strategy<Value = Book> {
    (
        prop::string::string_regex("[A-Za-z ]{0,20}").unwrap(),
        prop::string::string_regex("[A-Za-z ]{0,12}").unwrap(),
        prop::option::of(prop::string::string_regex("[A-Za-z]{1,8}").unwrap()),
        1_i64..10_000_000,
        any::<bool>(),
        0_i32..2_000,
    )
        .prop_map(|(title, author, genre, cents, availability, pages)| Book {
            title,
            author,
            genre: genre.unwrap_or_default(),
            price: Money::from_cents(cents),
            availability,
            pages,
            ..Book::default()
        })
}

proptest! {
    /// Property: a snapshot never differs from itself
    #[test]
    fn proptest_identical_snapshots_have_no_changes(book in arb_book()) {
        let registry = registry();
        let snapshot = book.snapshot();

        let changes = diff_snapshots(
            book_capability(&registry),
            &snapshot,
            &snapshot,
            DEFAULT_REDACTION_TOKEN,
        ).unwrap();

        prop_assert!(changes.is_empty());
    }

    /// Property: a changed price is reported, never revealed
    #[test]
    fn proptest_masked_price_never_leaks(
        before in arb_book(),
        after_cents in 1_i64..10_000_000,
    ) {
        prop_assume!(before.price.cents() != after_cents);
        let registry = registry();
        let mut after = before.clone();
        after.price = Money::from_cents(after_cents);

        let changes = diff_snapshots(
            book_capability(&registry),
            &before.snapshot(),
            &after.snapshot(),
            DEFAULT_REDACTION_TOKEN,
        ).unwrap();
        let details = changes.to_json().unwrap();

        prop_assert_eq!(changes.field_names(), vec!["Price"]);
        prop_assert!(!details.contains(&before.price.to_string()));
        prop_assert!(!details.contains(&after.price.to_string()));
        prop_assert!(details.contains(DEFAULT_REDACTION_TOKEN));
    }

    /// Property: exactly the fields that differ are reported, in declared order
    #[test]
    fn proptest_reports_exactly_changed_fields_in_order(
        before in arb_book(),
        after in arb_book(),
    ) {
        let registry = registry();
        let capability = book_capability(&registry);
        let original = before.snapshot();
        let current = after.snapshot();

        let changes = diff_snapshots(capability, &original, &current, DEFAULT_REDACTION_TOKEN)
            .unwrap();

        let expected: Vec<&str> = capability
            .diff_fields()
            .filter(|field| original.get(field) != current.get(field))
            .collect();
        prop_assert_eq!(changes.field_names(), expected);
    }

    /// Property: the identifier is never part of the change list
    #[test]
    fn proptest_identifier_is_not_diffed(book in arb_book()) {
        let registry = registry();
        let mut renamed = book.clone();
        renamed.id = BookId::new();

        let changes = diff_snapshots(
            book_capability(&registry),
            &book.snapshot(),
            &renamed.snapshot(),
            DEFAULT_REDACTION_TOKEN,
        ).unwrap();

        prop_assert!(changes.get("ID").is_none());
        prop_assert!(changes.is_empty());
    }

    /// Property: stored change details parse back to the same change list
    #[test]
    fn proptest_change_details_parse_back(before in arb_book(), after in arb_book()) {
        let registry = registry();
        let changes = diff_snapshots(
            book_capability(&registry),
            &before.snapshot(),
            &after.snapshot(),
            DEFAULT_REDACTION_TOKEN,
        ).unwrap();

        let parsed = ChangeSet::from_json(&changes.to_json().unwrap()).unwrap();
        prop_assert_eq!(parsed, changes);
    }
}
