//! Property-based tests for county parameter resolution.

use proptest::prelude::*;
use vc_common::{County, Error};
use vc_core::CountySelection;

fn county_strategy() -> impl Strategy<Value = County> {
    (1u8..=29).prop_map(|id| County::from_id(id).unwrap())
}

/// Wrap a name in the quoting and padding a toolbox parameter may carry.
fn decorate(name: &str, quote: u8, pad: usize) -> String {
    let spaces = " ".repeat(pad);
    match quote {
        0 => format!("{spaces}{name}{spaces}"),
        1 => format!("{spaces}'{name}'{spaces}"),
        _ => format!("{spaces}\"{name}\"{spaces}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn ids_follow_input_order(
        picks in prop::collection::vec((county_strategy(), 0u8..3, 0usize..3), 1..8)
    ) {
        let input = picks
            .iter()
            .map(|(county, quote, pad)| decorate(county.name, *quote, *pad))
            .collect::<Vec<_>>()
            .join(";");
        let selection = CountySelection::parse(&input, "COUNTY_ID").unwrap();

        let expected: Vec<u8> = picks.iter().map(|(county, _, _)| county.id).collect();
        prop_assert_eq!(selection.ids(), expected.as_slice());
        prop_assert_eq!(selection.counties.len(), picks.len());
    }

    #[test]
    fn predicate_shape_depends_on_count(
        picks in prop::collection::vec(county_strategy(), 1..6)
    ) {
        let input = picks.iter().map(|c| c.name).collect::<Vec<_>>().join(";");
        let sql = CountySelection::parse(&input, "COUNTY_ID").unwrap().filter.to_sql();
        if picks.len() == 1 {
            prop_assert_eq!(sql, format!("COUNTY_ID = {}", picks[0].id));
        } else {
            let ids = picks.iter().map(|c| c.id.to_string()).collect::<Vec<_>>().join(",");
            prop_assert_eq!(sql, format!("COUNTY_ID in ({ids})"));
        }
    }

    #[test]
    fn any_unknown_token_fails_the_whole_selection(
        known in prop::collection::vec(county_strategy(), 0..4),
        unknown in "[a-z]{3,12}",
        position in 0usize..5,
    ) {
        prop_assume!(County::lookup(&unknown).is_none());
        let mut tokens: Vec<String> = known.iter().map(|c| c.name.to_string()).collect();
        let at = position.min(tokens.len());
        tokens.insert(at, unknown.clone());

        let err = CountySelection::parse(&tokens.join(";"), "COUNTY_ID").unwrap_err();
        prop_assert!(matches!(err, Error::UnknownCounty { ref name } if *name == unknown), "unexpected error: {:?}", err);
    }

    #[test]
    fn lowercase_names_are_not_recognized(county in county_strategy()) {
        let lower = county.name.to_lowercase();
        prop_assume!(lower != county.name);
        let err = CountySelection::parse(&lower, "COUNTY_ID").unwrap_err();
        prop_assert!(matches!(err, Error::UnknownCounty { .. }), "unexpected error: {:?}", err);
    }
}

#[test]
fn blank_parameter_is_an_empty_selection() {
    for input in ["", "   ", "''", "\"\""] {
        assert!(matches!(
            CountySelection::parse(input, "COUNTY_ID"),
            Err(Error::EmptySelection)
        ));
    }
}
