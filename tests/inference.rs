use csv_mapper::inference::{TypeTag, infer_type, is_datetime};
use proptest::prelude::*;

fn integer_literal() -> impl Strategy<Value = String> {
    ("[+-]?", "[0-9]{1,18}").prop_map(|(sign, digits)| format!("{sign}{digits}"))
}

proptest! {
    #[test]
    fn digit_only_samples_infer_int(
        values in prop::collection::vec(integer_literal(), 1..8),
        blanks in prop::collection::vec(prop::sample::select(vec!["", " ", "\t"]), 0..3),
    ) {
        let mut samples = values;
        samples.extend(blanks.into_iter().map(str::to_string));
        prop_assert_eq!(infer_type(&samples), TypeTag::Int);
    }

    #[test]
    fn one_fractional_value_makes_the_set_decimal(
        values in prop::collection::vec(integer_literal(), 0..6),
        whole in 0u32..100_000,
        fraction in 1u32..1000,
        position in any::<prop::sample::Index>(),
    ) {
        let mut samples = values;
        let at = position.index(samples.len() + 1);
        samples.insert(at, format!("{whole}.{fraction}"));
        prop_assert_eq!(infer_type(&samples), TypeTag::Decimal);
    }

    #[test]
    fn inference_is_deterministic(samples in prop::collection::vec(".{0,12}", 0..6)) {
        prop_assert_eq!(infer_type(&samples), infer_type(&samples));
    }
}

#[test]
fn mixed_dates_and_text_fall_back_to_string() {
    assert_eq!(
        infer_type(&["2024-01-01", "soon", "03/04/2020"]),
        TypeTag::String
    );
    assert_eq!(
        infer_type(&["2024-01-01", "", "March 4, 2020", "20200304T"]),
        TypeTag::String
    );
    assert_eq!(
        infer_type(&["2024-01-01", "March 4, 2020", "19/04/2020"]),
        TypeTag::DateTime
    );
}

#[test]
fn date_time_variants_are_recognised() {
    for raw in [
        "2024-01-31T08:30:00",
        "2024-01-31T08:30:00Z",
        "01/31/2024 8:30 PM",
        "31/01/2024 20:30:00",
        "2024-01-31 08:30",
    ] {
        assert!(is_datetime(raw), "expected {raw} to parse");
    }
}
