//! Assessment Question definitions (AQ1-AQ15)
//!
//! Each question pairs a feature filter with the data type it applies to.
//! Odd/even numbering mostly alternates qualitative/quantitative, except
//! around AQ7-AQ9 where AQ7 covers all features and AQ9 is the
//! concentration-weighted variant of AQ8.

use crate::classification::Tag;
use crate::detection::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which features a question averages over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFilter {
    Tagged(Tag),
    All,
    /// ROF features weighted by spatial concentration (AQ9)
    ConcentrationWeighted,
}

impl FeatureFilter {
    /// Tag that selects the features, `None` for all features
    pub fn tag(&self) -> Option<Tag> {
        match self {
            FeatureFilter::Tagged(tag) => Some(*tag),
            FeatureFilter::All => None,
            FeatureFilter::ConcentrationWeighted => Some(Tag::Rof),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssessmentQuestion {
    Aq1,
    Aq2,
    Aq3,
    Aq4,
    Aq5,
    Aq6,
    Aq7,
    Aq8,
    Aq9,
    Aq10,
    Aq11,
    Aq12,
    Aq13,
    Aq14,
    Aq15,
}

use AssessmentQuestion::*;

/// Questions applicable to qualitative data (EV candidates)
pub const QUALITATIVE_AQS: [AssessmentQuestion; 7] = [Aq1, Aq3, Aq5, Aq7, Aq10, Aq12, Aq14];

/// Questions applicable to quantitative data (EV candidates)
pub const QUANTITATIVE_AQS: [AssessmentQuestion; 8] = [Aq2, Aq4, Aq6, Aq8, Aq9, Aq11, Aq13, Aq15];

impl AssessmentQuestion {
    pub const ALL: [AssessmentQuestion; 15] = [
        Aq1, Aq2, Aq3, Aq4, Aq5, Aq6, Aq7, Aq8, Aq9, Aq10, Aq11, Aq12, Aq13, Aq14, Aq15,
    ];

    /// Question number, 1-15
    pub fn number(&self) -> usize {
        self.index() + 1
    }

    /// Zero-based position, used to index score rows
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_number(number: usize) -> Option<Self> {
        Self::ALL.get(number.checked_sub(1)?).copied()
    }

    pub fn label(&self) -> String {
        format!("AQ{}", self.number())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Aq1 | Aq3 | Aq5 | Aq7 | Aq10 | Aq12 | Aq14 => DataType::Qualitative,
            Aq2 | Aq4 | Aq6 | Aq8 | Aq9 | Aq11 | Aq13 | Aq15 => DataType::Quantitative,
        }
    }

    pub fn feature_filter(&self) -> FeatureFilter {
        match self {
            Aq1 | Aq2 => FeatureFilter::Tagged(Tag::Lrf),
            Aq3 | Aq4 => FeatureFilter::Tagged(Tag::Rrf),
            Aq5 | Aq6 => FeatureFilter::Tagged(Tag::Nrf),
            Aq7 => FeatureFilter::All,
            Aq8 => FeatureFilter::Tagged(Tag::Rof),
            Aq9 => FeatureFilter::ConcentrationWeighted,
            Aq10 | Aq11 => FeatureFilter::Tagged(Tag::Esf),
            Aq12 | Aq13 => FeatureFilter::Tagged(Tag::HfsBh),
            Aq14 | Aq15 => FeatureFilter::Tagged(Tag::Ss),
        }
    }

    /// Questions valid for a data type, in EV order
    pub fn for_data_type(data_type: DataType) -> &'static [AssessmentQuestion] {
        match data_type {
            DataType::Qualitative => &QUALITATIVE_AQS,
            DataType::Quantitative => &QUANTITATIVE_AQS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aq1 => "Locally Rare Features (LRF) - Qualitative",
            Aq2 => "Locally Rare Features (LRF) - Quantitative",
            Aq3 => "Regionally Rare Features (RRF) - Qualitative",
            Aq4 => "Regionally Rare Features (RRF) - Quantitative",
            Aq5 => "Nationally Rare Features (NRF) - Qualitative",
            Aq6 => "Nationally Rare Features (NRF) - Quantitative",
            Aq7 => "All Features - Qualitative",
            Aq8 => "Regularly Occurring Features (ROF) - Quantitative",
            Aq9 => "ROF Concentration-Weighted - Quantitative",
            Aq10 => "Ecologically Significant Features (ESF) - Qualitative",
            Aq11 => "Ecologically Significant Features (ESF) - Quantitative",
            Aq12 => "Habitat Forming Species/Biogenic Habitat - Qualitative",
            Aq13 => "Habitat Forming Species/Biogenic Habitat - Quantitative",
            Aq14 => "Symbiotic Species (SS) - Qualitative",
            Aq15 => "Symbiotic Species (SS) - Quantitative",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Aq1 => "Features present in at most the locally rare share of subzones",
            Aq2 => "Abundance of locally rare features",
            Aq3 => "User-defined regionally rare features",
            Aq4 => "Abundance of regionally rare features",
            Aq5 => "User-defined nationally rare features",
            Aq6 => "Abundance of nationally rare features",
            Aq7 => "All features without filter (baseline assessment)",
            Aq8 => "Abundance of regularly occurring features",
            Aq9 => "Spatially concentrated regularly occurring features",
            Aq10 => "Keystone species and ecosystem engineers",
            Aq11 => "Abundance of ecologically significant features",
            Aq12 => "Corals, seagrasses, habitat-creating species",
            Aq13 => "Extent of habitat-forming features",
            Aq14 => "Species in symbiotic relationships",
            Aq15 => "Abundance of symbiotic species",
        }
    }

    /// When the question yields "not applicable"
    pub fn not_applicable_when(&self) -> &'static str {
        match self {
            Aq1 => "No locally rare features",
            Aq2 => "Qualitative data or no LRF",
            Aq3 => "No RRF defined",
            Aq4 => "Qualitative data or no RRF",
            Aq5 => "No NRF defined",
            Aq6 => "Qualitative data or no NRF",
            Aq7 => "Never (always active for qualitative)",
            Aq8 | Aq9 => "Qualitative data",
            Aq10 => "No ESF defined",
            Aq11 => "Qualitative data or no ESF",
            Aq12 => "No HFS/BH defined",
            Aq13 => "Qualitative data or no HFS/BH",
            Aq14 => "No SS defined",
            Aq15 => "Qualitative data or no SS",
        }
    }
}

impl fmt::Display for AssessmentQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AQ{}", self.number())
    }
}
