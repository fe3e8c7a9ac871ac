//! Multi-component store and Total EV aggregation
//!
//! Each saved ecosystem component (EC) is an immutable snapshot of one scored
//! dataset. Total EV per subzone is the sum of the saved components' EVs over
//! the union of their subzones; a subzone missing from a component, or whose
//! EV is undefined there, contributes 0.

use crate::classification::{Classification, UserClassifications};
use crate::data::Dataset;
use crate::detection::DataType;
use crate::error::StoreError;
use crate::metrics::{AqTable, EvTable};
use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Saved state of one scored ecosystem component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub name: String,
    pub dataset: Dataset,
    pub data_type: DataType,
    pub classification: Classification,
    pub user_classifications: UserClassifications,
    pub aq_table: AqTable,
    pub ev_table: EvTable,
    pub feature_count: usize,
    pub saved_at: DateTime<Utc>,
}

/// Per-component line of the store overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub name: String,
    pub data_type: DataType,
    pub feature_count: usize,
    pub mean_ev: Option<f64>,
}

/// Subzones of the union each component lacks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubzoneConsistency {
    pub union_size: usize,
    /// (component, missing subzone IDs); only components with gaps
    pub missing: Vec<(String, Vec<String>)>,
}

impl SubzoneConsistency {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Subzone × component EV with a Total EV column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalEvTable {
    subzone_ids: Vec<String>,
    components: Vec<String>,
    /// One column per component, zero-filled
    columns: Vec<Vec<f64>>,
    totals: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalEvSummary {
    pub sum: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl TotalEvTable {
    pub fn subzone_ids(&self) -> &[String] {
        &self.subzone_ids
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// EV column of a component by position
    pub fn component_column(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    pub fn len(&self) -> usize {
        self.subzone_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subzone_ids.is_empty()
    }

    /// Total EV of a subzone
    pub fn total(&self, subzone_id: &str) -> Option<f64> {
        self.subzone_ids
            .iter()
            .position(|id| id == subzone_id)
            .map(|idx| self.totals[idx])
    }

    /// Sum / mean / max / min of Total EV; `None` for an empty table
    pub fn summary(&self) -> Option<TotalEvSummary> {
        if self.totals.is_empty() {
            return None;
        }
        let sum: f64 = self.totals.iter().sum();
        Some(TotalEvSummary {
            sum,
            mean: sum / self.totals.len() as f64,
            max: self.totals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: self.totals.iter().copied().fold(f64::INFINITY, f64::min),
        })
    }

    /// (subzone, Total EV) sorted by Total EV, highest first
    pub fn sorted_by_total(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .subzone_ids
            .iter()
            .map(String::as_str)
            .zip(self.totals.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Named snapshots in save order
#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    snapshots: Vec<ComponentSnapshot>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a snapshot, replacing any snapshot with the same name in place
    ///
    /// Names are stored trimmed.
    pub fn save(&mut self, mut snapshot: ComponentSnapshot) -> Result<(), StoreError> {
        let name = snapshot.name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        snapshot.name = name.to_string();

        match self.snapshots.iter_mut().find(|s| s.name == snapshot.name) {
            Some(existing) => {
                debug!("Replacing ecosystem component '{}'", snapshot.name);
                *existing = snapshot;
            }
            None => {
                debug!("Saving ecosystem component '{}'", snapshot.name);
                self.snapshots.push(snapshot);
            }
        }
        Ok(())
    }

    pub fn restore(&self, name: &str) -> Option<&ComponentSnapshot> {
        let name = name.trim();
        self.snapshots.iter().find(|s| s.name == name)
    }

    pub fn delete(&mut self, name: &str) -> Option<ComponentSnapshot> {
        let name = name.trim();
        let idx = self.snapshots.iter().position(|s| s.name == name)?;
        Some(self.snapshots.remove(idx))
    }

    pub fn names(&self) -> Vec<&str> {
        self.snapshots.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentSnapshot> {
        self.snapshots.iter()
    }

    /// Subzone IDs of all snapshots, first-seen order
    fn subzone_union(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut union = Vec::new();
        for snapshot in &self.snapshots {
            for id in snapshot.ev_table.subzone_ids() {
                if seen.insert(id.as_str()) {
                    union.push(id.clone());
                }
            }
        }
        union
    }

    pub fn subzone_consistency(&self) -> SubzoneConsistency {
        let union = self.subzone_union();

        let missing = self
            .snapshots
            .iter()
            .filter_map(|snapshot| {
                let own: FxHashSet<&str> =
                    snapshot.ev_table.subzone_ids().iter().map(String::as_str).collect();
                let lacking: Vec<String> = union
                    .iter()
                    .filter(|id| !own.contains(id.as_str()))
                    .cloned()
                    .collect();
                (!lacking.is_empty()).then(|| (snapshot.name.clone(), lacking))
            })
            .collect();

        SubzoneConsistency {
            union_size: union.len(),
            missing,
        }
    }

    /// Outer-join all snapshots' EVs on Subzone ID and sum them
    pub fn aggregate(&self) -> TotalEvTable {
        let subzone_ids = self.subzone_union();
        let row_of: FxHashMap<&str, usize> = subzone_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();

        let consistency = self.subzone_consistency();
        if !consistency.is_consistent() {
            for (name, lacking) in &consistency.missing {
                warn!(
                    "Component '{}' lacks {} of {} subzones; counting them as 0",
                    name,
                    lacking.len(),
                    consistency.union_size
                );
            }
        }

        let mut totals = vec![0.0; subzone_ids.len()];
        let mut columns = Vec::with_capacity(self.snapshots.len());

        for snapshot in &self.snapshots {
            let mut column = vec![0.0; subzone_ids.len()];
            for (id, ev) in snapshot.ev_table.iter() {
                if let (Some(&row), Some(value)) = (row_of.get(id), ev) {
                    column[row] = value;
                }
            }
            for (total, value) in totals.iter_mut().zip(&column) {
                *total += value;
            }
            columns.push(column);
        }

        TotalEvTable {
            subzone_ids,
            components: self.snapshots.iter().map(|s| s.name.clone()).collect(),
            columns,
            totals,
        }
    }

    /// Name, type, feature count and mean EV of every component
    pub fn summaries(&self) -> Vec<ComponentSummary> {
        self.snapshots
            .iter()
            .map(|s| ComponentSummary {
                name: s.name.clone(),
                data_type: s.data_type,
                feature_count: s.feature_count,
                mean_ev: s.ev_table.mean(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::classify_features;
    use approx::assert_relative_eq;

    fn snapshot(name: &str, evs: &[(&str, Option<f64>)]) -> ComponentSnapshot {
        let ids: Vec<&str> = evs.iter().map(|(id, _)| *id).collect();
        let rows: Vec<Vec<f64>> = evs.iter().map(|_| vec![1.0]).collect();
        let dataset = Dataset::from_rows(&ids, &["f"], &rows).unwrap();
        let classification = classify_features(&dataset, &UserClassifications::default(), 0.05);
        let id_strings: Vec<String> = ids.iter().map(|s| s.to_string()).collect();

        ComponentSnapshot {
            name: name.to_string(),
            data_type: DataType::Qualitative,
            classification,
            user_classifications: UserClassifications::default(),
            aq_table: AqTable::new(id_strings.clone(), vec![[None; 15]; ids.len()]),
            ev_table: EvTable::new(id_strings, evs.iter().map(|(_, ev)| *ev).collect()),
            feature_count: 1,
            dataset,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_two_component_outer_join() {
        let mut store = ComponentStore::new();
        store
            .save(snapshot("A", &[("S1", Some(1.0)), ("S2", Some(2.0))]))
            .unwrap();
        store
            .save(snapshot("B", &[("S1", Some(1.0)), ("S2", Some(2.0)), ("S3", Some(4.0))]))
            .unwrap();

        let total = store.aggregate();
        assert_eq!(total.subzone_ids(), &["S1", "S2", "S3"]);
        assert_relative_eq!(total.total("S1").unwrap(), 2.0);
        assert_relative_eq!(total.total("S2").unwrap(), 4.0);
        assert_relative_eq!(total.total("S3").unwrap(), 4.0);
        assert_eq!(total.component_column(0), &[1.0, 2.0, 0.0]);

        let consistency = store.subzone_consistency();
        assert_eq!(consistency.missing, vec![("A".to_string(), vec!["S3".to_string()])]);

        let summary = total.summary().unwrap();
        assert_relative_eq!(summary.sum, 10.0);
        assert_relative_eq!(summary.max, 4.0);
        assert_relative_eq!(summary.min, 2.0);
    }

    #[test]
    fn test_single_snapshot_identity() {
        let mut store = ComponentStore::new();
        store
            .save(snapshot("Fish", &[("S1", Some(3.2)), ("S2", Some(0.5))]))
            .unwrap();

        let total = store.aggregate();
        assert_eq!(total.totals(), &[3.2, 0.5]);
    }

    #[test]
    fn test_undefined_ev_counts_as_zero() {
        let mut store = ComponentStore::new();
        store.save(snapshot("A", &[("S1", None), ("S2", Some(1.5))])).unwrap();
        assert_eq!(store.aggregate().totals(), &[0.0, 1.5]);
    }

    #[test]
    fn test_save_replaces_in_place() {
        let mut store = ComponentStore::new();
        store.save(snapshot("A", &[("S1", Some(1.0))])).unwrap();
        store.save(snapshot("B", &[("S1", Some(2.0))])).unwrap();
        store.save(snapshot("A", &[("S1", Some(5.0))])).unwrap();

        assert_eq!(store.names(), vec!["A", "B"]);
        assert_relative_eq!(store.aggregate().total("S1").unwrap(), 7.0);
    }

    #[test]
    fn test_save_trims_name() {
        let mut store = ComponentStore::new();
        store.save(snapshot(" A ", &[("S1", Some(1.0))])).unwrap();

        assert_eq!(store.names(), vec!["A"]);
        assert_eq!(store.restore("A").unwrap().name, "A");

        store.save(snapshot("A", &[("S1", Some(5.0))])).unwrap();
        assert_eq!(store.len(), 1);
        assert_relative_eq!(store.aggregate().total("S1").unwrap(), 5.0);

        assert!(store.delete(" A").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut store = ComponentStore::new();
        let err = store.save(snapshot("  ", &[("S1", Some(1.0))])).unwrap_err();
        assert_eq!(err, StoreError::EmptyName);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_and_empty_aggregate() {
        let mut store = ComponentStore::new();
        store.save(snapshot("A", &[("S1", Some(1.0))])).unwrap();
        assert!(store.delete("missing").is_none());
        assert_eq!(store.delete("A").map(|s| s.name), Some("A".to_string()));

        let total = store.aggregate();
        assert!(total.is_empty());
        assert!(total.summary().is_none());
    }

    #[test]
    fn test_sorted_by_total_descending() {
        let mut store = ComponentStore::new();
        store
            .save(snapshot("A", &[("S1", Some(1.0)), ("S2", Some(4.0)), ("S3", Some(2.5))]))
            .unwrap();

        let total = store.aggregate();
        let ranked: Vec<&str> = total.sorted_by_total().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ranked, vec!["S2", "S3", "S1"]);

        let summaries = store.summaries();
        assert_relative_eq!(summaries[0].mean_ev.unwrap(), 2.5);
    }
}
