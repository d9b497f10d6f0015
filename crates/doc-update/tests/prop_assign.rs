//! Property tests for the engine's algebraic contracts over generated
//! document trees.

use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::json;

use doc_update::{assign, decode_operation, Document, UpdateOperation};

fn arb_document() -> impl Strategy<Value = Document> {
    let leaf = prop_oneof![
        Just(Document::Null),
        any::<bool>().prop_map(Document::Bool),
        (-1_000i64..1_000).prop_map(Document::Int),
        (-1_000.0f64..1_000.0).prop_map(Document::Float),
        "[a-z]{0,6}".prop_map(Document::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Document::array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(|entries| {
                let mut fields = IndexMap::new();
                for (key, value) in entries {
                    fields.insert(key, value);
                }
                Document::object(fields)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn empty_operation_is_identity(doc in arb_document()) {
        let snapshot = doc.to_json();
        let updated = assign(&doc, &UpdateOperation::default()).unwrap();
        prop_assert_eq!(&updated, &doc);
        prop_assert_eq!(doc.to_json(), snapshot);
    }

    #[test]
    fn top_level_set_shares_untouched_entries(a in arb_document(), b in arb_document()) {
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), a);
        fields.insert("b".to_string(), b);
        let doc = Document::object(fields);
        let snapshot = doc.to_json();

        let operation = decode_operation(&json!({"$set": {"fresh": 1}})).unwrap();
        let updated = assign(&doc, &operation).unwrap();

        for key in ["a", "b"] {
            let before = doc.get(key).unwrap();
            let after = updated.get(key).unwrap();
            prop_assert_eq!(before, after);
            let is_container =
                before.as_object().is_some() || before.as_array().is_some();
            if is_container {
                prop_assert!(before.ptr_eq(after), "untouched container was copied");
            }
        }
        prop_assert_eq!(updated.get("fresh"), Some(&Document::Int(1)));
        prop_assert_eq!(doc.to_json(), snapshot);
    }

    #[test]
    fn set_is_idempotent(value in arb_document()) {
        let doc = Document::from(json!({"slot": null}));
        let mut operands = IndexMap::new();
        operands.insert("slot".to_string(), value);
        let operation = UpdateOperation::from(vec![doc_update::UpdateOperator::Set(operands)]);

        let once = assign(&doc, &operation).unwrap();
        let twice = assign(&once, &operation).unwrap();
        prop_assert_eq!(once, twice);
    }
}
