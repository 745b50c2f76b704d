use super::{
    Transformation, TransformationKind,
    params::{DELIMITER, TransformParameters},
};

pub const DEFAULT_DELIMITER: &str = " ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPosition {
    First,
    Last,
}

/// Splits on a literal delimiter and keeps the first or last segment.
#[derive(Debug, Clone, Copy)]
pub struct SplitToken {
    position: TokenPosition,
}

impl SplitToken {
    pub fn first() -> Self {
        Self {
            position: TokenPosition::First,
        }
    }

    pub fn last() -> Self {
        Self {
            position: TokenPosition::Last,
        }
    }

    pub fn position(&self) -> TokenPosition {
        self.position
    }
}

impl Transformation for SplitToken {
    fn kind(&self) -> TransformationKind {
        match self.position {
            TokenPosition::First => TransformationKind::SplitFirstToken,
            TokenPosition::Last => TransformationKind::SplitLastToken,
        }
    }

    fn transform(&self, input: &str, params: &TransformParameters) -> String {
        if input.trim().is_empty() {
            return String::new();
        }
        let delimiter = params.text_or(DELIMITER, DEFAULT_DELIMITER);
        if delimiter.is_empty() {
            return input.to_string();
        }
        let token = match self.position {
            TokenPosition::First => input.split(delimiter).next(),
            TokenPosition::Last => input.rsplit(delimiter).next(),
        };
        token.unwrap_or(input).to_string()
    }

    fn describe(&self, params: &TransformParameters) -> String {
        let delimiter = params.text_or(DELIMITER, DEFAULT_DELIMITER);
        let shown = if delimiter == " " {
            "space".to_string()
        } else {
            format!("'{delimiter}'")
        };
        match self.position {
            TokenPosition::First => format!("Extract first part before {shown}"),
            TokenPosition::Last => format!("Extract last part after {shown}"),
        }
    }

    fn validate_parameters(&self, _params: &TransformParameters) -> Result<(), String> {
        // Delimiter is optional.
        Ok(())
    }
}
