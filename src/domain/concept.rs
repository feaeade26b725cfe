//! Concept dictionary entries

use serde::{Deserialize, Serialize};

/// Datatype of a concept's observation values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConceptDatatype {
    Numeric,
    Text,
    Coded,
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ConceptDatatype {
    /// Maps an OpenMRS datatype display name
    pub fn from_display(display: &str) -> Self {
        match display.trim().to_lowercase().as_str() {
            "numeric" => Self::Numeric,
            "text" => Self::Text,
            "coded" => Self::Coded,
            _ => Self::NotApplicable,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Text => "Text",
            Self::Coded => "Coded",
            Self::NotApplicable => "N/A",
        }
    }
}

/// A concept as held in the OpenMRS dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub uuid: String,

    /// Fully specified name
    pub name: String,

    #[serde(default)]
    pub short_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub datatype: ConceptDatatype,

    #[serde(default)]
    pub concept_class: Option<String>,

    /// Absolute upper bound for numeric concepts
    #[serde(default)]
    pub hi_absolute: Option<f64>,

    /// Absolute lower bound for numeric concepts
    #[serde(default)]
    pub low_absolute: Option<f64>,

    #[serde(default)]
    pub retired: bool,
}

impl Concept {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, datatype: ConceptDatatype) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            short_name: None,
            description: None,
            datatype,
            concept_class: None,
            hi_absolute: None,
            low_absolute: None,
            retired: false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.datatype == ConceptDatatype::Numeric
    }

    /// Checks a numeric value against the absolute bounds, if any
    pub fn within_absolute_range(&self, value: f64) -> bool {
        let above_low = self.low_absolute.map(|low| value >= low).unwrap_or(true);
        let below_high = self.hi_absolute.map(|high| value <= high).unwrap_or(true);
        above_low && below_high
    }
}
