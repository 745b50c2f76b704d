//! Ready-made parameter sets for the transforms operators reach for most.

use std::collections::BTreeMap;

use super::{
    TransformParameters, TransformationKind,
    date_format::DEFAULT_TARGET_FORMAT,
    params::{CASE_SENSITIVE, DEFAULT_VALUE, DELIMITER, MAPPINGS, TARGET_FORMAT},
};

/// A transformation kind with its parameters.
pub type Preset = (TransformationKind, TransformParameters);

const GENDER_CODES: &[(&str, &str)] = &[
    ("M", "M"),
    ("Male", "M"),
    ("Man", "M"),
    ("Boy", "M"),
    ("F", "F"),
    ("Female", "F"),
    ("Woman", "F"),
    ("Girl", "F"),
    ("O", "O"),
    ("Other", "O"),
    ("Non-binary", "O"),
    ("U", "U"),
    ("Unknown", "U"),
    ("Not Specified", "U"),
    ("", "U"),
];

pub fn first_name() -> Preset {
    (
        TransformationKind::SplitFirstToken,
        TransformParameters::new().with(DELIMITER, " "),
    )
}

pub fn last_name() -> Preset {
    (
        TransformationKind::SplitLastToken,
        TransformParameters::new().with(DELIMITER, " "),
    )
}

pub fn iso_date() -> Preset {
    (
        TransformationKind::DateFormat,
        TransformParameters::new().with(TARGET_FORMAT, DEFAULT_TARGET_FORMAT),
    )
}

pub fn extract_year() -> Preset {
    (
        TransformationKind::DateFormat,
        TransformParameters::new().with(TARGET_FORMAT, "yyyy"),
    )
}

/// Gender values folded onto `M`/`F`/`O`/`U`; anything unrecognised is `U`.
pub fn standard_gender() -> Preset {
    let mappings = GENDER_CODES
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect::<BTreeMap<_, _>>();
    (
        TransformationKind::CategoryMapping,
        TransformParameters::new()
            .with(MAPPINGS, mappings)
            .with(CASE_SENSITIVE, false)
            .with(DEFAULT_VALUE, "U"),
    )
}
