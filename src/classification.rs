//! Feature Classification
//!
//! Every feature gets exactly one occurrence tag derived from the data:
//! - LRF (locally rare): present in at most `lrf_threshold` of the observed subzones
//! - ROF (regularly occurring): everything that is not LRF
//!
//! User-assigned ecological roles (RRF, NRF, ESF, HFS_BH, SS) are merged in
//! verbatim. LRF/ROF cannot be set by the user.

use crate::data::Dataset;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Feature role tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    #[serde(rename = "LRF")]
    Lrf,
    #[serde(rename = "ROF")]
    Rof,
    #[serde(rename = "RRF")]
    Rrf,
    #[serde(rename = "NRF")]
    Nrf,
    #[serde(rename = "ESF")]
    Esf,
    #[serde(rename = "HFS_BH")]
    HfsBh,
    #[serde(rename = "SS")]
    Ss,
}

impl Tag {
    pub const ALL: [Tag; 7] = [Tag::Lrf, Tag::Rof, Tag::Rrf, Tag::Nrf, Tag::Esf, Tag::HfsBh, Tag::Ss];

    /// Tags the user may assign
    pub const USER: [Tag; 5] = [Tag::Rrf, Tag::Nrf, Tag::Esf, Tag::HfsBh, Tag::Ss];

    pub fn acronym(&self) -> &'static str {
        match self {
            Tag::Lrf => "LRF",
            Tag::Rof => "ROF",
            Tag::Rrf => "RRF",
            Tag::Nrf => "NRF",
            Tag::Esf => "ESF",
            Tag::HfsBh => "HFS_BH",
            Tag::Ss => "SS",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Tag::Lrf => "Locally rare feature",
            Tag::Rof => "Regularly occurring feature",
            Tag::Rrf => "Regionally rare feature",
            Tag::Nrf => "Nationally rare feature",
            Tag::Esf => "Ecologically significant feature",
            Tag::HfsBh => "Habitat forming species / biogenic habitat",
            Tag::Ss => "Symbiotic species",
        }
    }

    /// Derived from the data, never user-editable
    pub fn is_derived(&self) -> bool {
        matches!(self, Tag::Lrf | Tag::Rof)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.acronym())
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['/', '-'], "_");
        Tag::ALL
            .into_iter()
            .find(|t| t.acronym() == normalized)
            .ok_or_else(|| format!("unknown feature tag '{}'", s))
    }
}

/// Small sorted set of tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet(SmallVec<[Tag; 4]>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag; returns false if it was already present
    pub fn insert(&mut self, tag: Tag) -> bool {
        match self.0.binary_search(&tag) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, tag);
                true
            }
        }
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.binary_search(&tag).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|t| t.acronym()).collect();
        f.write_str(&names.join(", "))
    }
}

/// User-assigned roles: feature name → tags
pub type UserClassifications = FxHashMap<String, Vec<Tag>>;

/// Final per-feature tag sets, in dataset column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    features: Vec<String>,
    tags: Vec<TagSet>,
}

impl Classification {
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Tags of a feature by name
    pub fn tags_for(&self, feature: &str) -> Option<&TagSet> {
        self.features
            .iter()
            .position(|f| f == feature)
            .map(|idx| &self.tags[idx])
    }

    /// Tags of a feature by column index
    pub fn tags_at(&self, feature: usize) -> &TagSet {
        &self.tags[feature]
    }

    /// Column indices of features carrying `tag`
    pub fn features_with(&self, tag: Tag) -> Vec<usize> {
        self.tags
            .iter()
            .enumerate()
            .filter(|(_, set)| set.contains(tag))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn has_any(&self, tag: Tag) -> bool {
        self.tags.iter().any(|set| set.contains(tag))
    }

    /// Number of features per tag, in `Tag::ALL` order
    pub fn tag_counts(&self) -> Vec<(Tag, usize)> {
        Tag::ALL
            .into_iter()
            .map(|tag| (tag, self.tags.iter().filter(|s| s.contains(tag)).count()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagSet)> {
        self.features.iter().map(String::as_str).zip(self.tags.iter())
    }
}

/// Fraction of observed subzones where a feature is present (> 0)
pub fn occurrence_proportion(dataset: &Dataset, feature: usize) -> f64 {
    let (present, observed) = dataset
        .observed(feature)
        .fold((0usize, 0usize), |(p, n), v| (p + usize::from(v > 0.0), n + 1));

    if observed == 0 {
        0.0
    } else {
        present as f64 / observed as f64
    }
}

/// Classify every feature of a dataset
///
/// LRF uses an inclusive boundary: a feature present in exactly
/// `lrf_threshold` of subzones is locally rare. A feature never present is ROF.
pub fn classify_features(
    dataset: &Dataset,
    user_classifications: &UserClassifications,
    lrf_threshold: f64,
) -> Classification {
    let mut tags = Vec::with_capacity(dataset.n_features());

    for (idx, name) in dataset.features().iter().enumerate() {
        let proportion = occurrence_proportion(dataset, idx);
        let is_lrf = proportion > 0.0 && proportion <= lrf_threshold + f64::EPSILON;

        let mut set = TagSet::new();
        set.insert(if is_lrf { Tag::Lrf } else { Tag::Rof });

        if let Some(user_tags) = user_classifications.get(name) {
            for &tag in user_tags {
                if tag.is_derived() {
                    warn!("Ignoring user-assigned {} on '{}': derived from the data", tag, name);
                    continue;
                }
                set.insert(tag);
            }
        }

        tags.push(set);
    }

    Classification {
        features: dataset.features().to_vec(),
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presence_dataset(n_subzones: usize, n_present: usize) -> Dataset {
        let ids: Vec<String> = (0..n_subzones).map(|i| format!("S{}", i + 1)).collect();
        let column = (0..n_subzones)
            .map(|i| Some(if i < n_present { 1.0 } else { 0.0 }))
            .collect();
        Dataset::new(ids, vec!["sponge".to_string()], vec![column]).unwrap()
    }

    #[test]
    fn test_lrf_boundary_is_inclusive() {
        // 5 of 100 = exactly 5%
        let ds = presence_dataset(100, 5);
        let classification = classify_features(&ds, &UserClassifications::default(), 0.05);
        let tags = classification.tags_for("sponge").unwrap();
        assert!(tags.contains(Tag::Lrf));
        assert!(!tags.contains(Tag::Rof));
    }

    #[test]
    fn test_above_threshold_is_rof() {
        let ds = presence_dataset(100, 6);
        let classification = classify_features(&ds, &UserClassifications::default(), 0.05);
        assert!(classification.tags_at(0).contains(Tag::Rof));
        assert!(!classification.tags_at(0).contains(Tag::Lrf));
    }

    #[test]
    fn test_never_present_is_rof() {
        let ds = presence_dataset(10, 0);
        let classification = classify_features(&ds, &UserClassifications::default(), 0.05);
        assert!(classification.tags_at(0).contains(Tag::Rof));
    }

    #[test]
    fn test_user_tags_merged_and_derived_ignored() {
        let ds = presence_dataset(10, 5);
        let mut user = UserClassifications::default();
        user.insert("sponge".to_string(), vec![Tag::Esf, Tag::Lrf, Tag::Ss, Tag::Esf]);
        user.insert("ghost".to_string(), vec![Tag::Nrf]);

        let classification = classify_features(&ds, &user, 0.05);
        let tags = classification.tags_for("sponge").unwrap();
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec![Tag::Rof, Tag::Esf, Tag::Ss]);
        assert!(classification.tags_for("ghost").is_none());
        assert!(!classification.has_any(Tag::Nrf));
    }

    #[test]
    fn test_missing_values_excluded_from_denominator() {
        // 1 present out of 20 observed (5%), 80 missing
        let ids: Vec<String> = (0..100).map(|i| format!("S{}", i)).collect();
        let column = (0..100)
            .map(|i| match i {
                0 => Some(3.0),
                1..=19 => Some(0.0),
                _ => None,
            })
            .collect();
        let ds = Dataset::new(ids, vec!["eelgrass".to_string()], vec![column]).unwrap();

        assert!((occurrence_proportion(&ds, 0) - 0.05).abs() < 1e-12);
        let classification = classify_features(&ds, &UserClassifications::default(), 0.05);
        assert!(classification.tags_at(0).contains(Tag::Lrf));
    }

    #[test]
    fn test_tag_counts_and_lookup() {
        let ds = Dataset::from_rows(
            &["S1", "S2"],
            &["a", "b"],
            &[vec![1.0, 1.0], vec![0.0, 1.0]],
        )
        .unwrap();
        let mut user = UserClassifications::default();
        user.insert("b".to_string(), vec![Tag::HfsBh]);

        let classification = classify_features(&ds, &user, 0.05);
        let counts: FxHashMap<Tag, usize> = classification.tag_counts().into_iter().collect();
        assert_eq!(counts[&Tag::Rof], 2);
        assert_eq!(counts[&Tag::Lrf], 0);
        assert_eq!(counts[&Tag::HfsBh], 1);
        assert_eq!(classification.features_with(Tag::HfsBh), vec![1]);
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!("hfs/bh".parse::<Tag>().unwrap(), Tag::HfsBh);
        assert_eq!(" rrf ".parse::<Tag>().unwrap(), Tag::Rrf);
        assert!("XYZ".parse::<Tag>().is_err());

        let parsed: Vec<Tag> = serde_json::from_str(r#"["RRF", "HFS_BH"]"#).unwrap();
        assert_eq!(parsed, vec![Tag::Rrf, Tag::HfsBh]);
    }
}
