//! Property-based invariant tests for links over attribute channels.
//!
//! 1. After any write to a star member, every member holds the written value.
//! 2. A one-way link never writes back into its source.
//! 3. Unlinked widgets stop exchanging values.
//! 4. Link creation leaves the target equal to the source.

use coordkit_bind::{AttrWidget, Binder, LinkVariant, ObservableBinder, Value, Widget, WidgetRef};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn star(n: usize, start: &Value) -> (Vec<WidgetRef>, Vec<coordkit_bind::Link>) {
    let widgets: Vec<WidgetRef> = (0..n)
        .map(|_| AttrWidget::new().with_attribute("v", start.clone()).into_ref())
        .collect();
    let links = widgets[1..]
        .iter()
        .map(|leaf| ObservableBinder.bind((&widgets[0], "v"), (leaf, "v"), LinkVariant::Sync))
        .collect();
    (widgets, links)
}

proptest! {
    #[test]
    fn star_members_converge(
        n in 1usize..12,
        writes in proptest::collection::vec((any::<prop::sample::Index>(), arb_value()), 1..8),
    ) {
        let (widgets, _links) = star(n, &Value::Null);
        for (who, value) in writes {
            let w = who.index(n);
            widgets[w].set_attribute("v", value.clone());
            for widget in &widgets {
                prop_assert_eq!(widget.get_attribute("v"), Some(value.clone()));
            }
        }
    }

    #[test]
    fn one_way_never_writes_back(source in arb_value(), written in arb_value()) {
        let a = AttrWidget::new().with_attribute("v", source.clone()).into_ref();
        let b = AttrWidget::new().into_ref();
        let _link = ObservableBinder.bind_one_way((&a, "v"), (&b, "v"), LinkVariant::Sync);
        prop_assert_eq!(b.get_attribute("v"), Some(source.clone()));

        b.set_attribute("v", written);
        prop_assert_eq!(a.get_attribute("v"), Some(source));
    }

    #[test]
    fn unlinked_leaves_are_isolated(
        n in 2usize..8,
        cut in any::<prop::sample::Index>(),
        value in arb_value(),
    ) {
        let start = Value::from("start");
        prop_assume!(value != start);
        let (widgets, mut links) = star(n, &start);
        let cut = cut.index(links.len());
        ObservableBinder.unlink(&mut links[cut]).unwrap();

        widgets[0].set_attribute("v", value.clone());
        for (i, leaf) in widgets[1..].iter().enumerate() {
            let expected = if i == cut { start.clone() } else { value.clone() };
            prop_assert_eq!(leaf.get_attribute("v"), Some(expected));
        }
    }

    #[test]
    fn bind_copies_source_into_target(source in arb_value(), target in arb_value()) {
        let a = AttrWidget::new().with_attribute("x", source.clone()).into_ref();
        let b = AttrWidget::new().with_attribute("y", target).into_ref();
        let link = ObservableBinder.bind((&a, "x"), (&b, "y"), LinkVariant::ClientSide);
        prop_assert!(link.is_live());
        prop_assert_eq!(b.get_attribute("y"), Some(source));
    }
}
