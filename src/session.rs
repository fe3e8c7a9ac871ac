//! Assessment session
//!
//! Owns the working state of one user: the dataset being classified, its
//! tags and type override, and the store of saved components. All state
//! changes go through explicit methods; nothing recalculates implicitly
//! except `save_current`, which always scores fresh before snapshotting.

use crate::classification::UserClassifications;
use crate::data::{Dataset, ValidationReport};
use crate::detection::DataType;
use crate::error::{EvaError, EvaResult, StoreError};
use crate::scorer::{ComponentScore, EvScorer};
use crate::store::{ComponentSnapshot, ComponentStore, TotalEvTable};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Session {
    scorer: EvScorer,
    dataset: Option<Dataset>,
    user_classifications: UserClassifications,
    data_type: Option<DataType>,
    current_name: Option<String>,
    last_score: Option<ComponentScore>,
    store: ComponentStore,
}

impl Session {
    pub fn new(scorer: EvScorer) -> Self {
        Self {
            scorer,
            ..Self::default()
        }
    }

    /// Make `dataset` the current one
    ///
    /// Tags and the type override belong to the previous dataset and are
    /// cleared.
    pub fn load_dataset(&mut self, dataset: Dataset) -> ValidationReport {
        let report = dataset.validation_report();
        info!(
            "Loaded dataset: {} subzones, {} features, {} missing cells",
            report.rows,
            report.feature_count,
            report.total_missing()
        );
        self.dataset = Some(dataset);
        self.user_classifications.clear();
        self.data_type = None;
        self.last_score = None;
        report
    }

    pub fn set_user_classifications(&mut self, classifications: UserClassifications) {
        self.user_classifications = classifications;
        self.last_score = None;
    }

    pub fn reset_classifications(&mut self) {
        self.user_classifications.clear();
        self.last_score = None;
    }

    /// Override the detected data type; `None` returns to detection
    pub fn set_data_type(&mut self, data_type: Option<DataType>) {
        self.data_type = data_type;
        self.last_score = None;
    }

    /// Score the current dataset
    pub fn calculate(&mut self) -> EvaResult<&ComponentScore> {
        let dataset = self.dataset.as_ref().ok_or(EvaError::NoDataset)?;
        let score = self
            .scorer
            .score(dataset, self.data_type, &self.user_classifications)?;
        Ok(self.last_score.insert(score))
    }

    /// Recalculate and save the current dataset under `name`
    ///
    /// A component with the same name is replaced.
    pub fn save_current(&mut self, name: &str) -> EvaResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName.into());
        }

        let dataset = self.dataset.clone().ok_or(EvaError::NoDataset)?;
        let score = self
            .scorer
            .score(&dataset, self.data_type, &self.user_classifications)?;
        let snapshot = score.into_snapshot(name, dataset, self.user_classifications.clone());

        self.store.save(snapshot)?;
        self.current_name = Some(name.to_string());
        info!("Saved ecosystem component '{}' ({} in store)", name, self.store.len());
        Ok(())
    }

    /// Load a saved component back as the current dataset
    pub fn restore(&mut self, name: &str) -> EvaResult<()> {
        let snapshot = self
            .store
            .restore(name)
            .ok_or_else(|| StoreError::UnknownComponent(name.to_string()))?;

        self.dataset = Some(snapshot.dataset.clone());
        self.user_classifications = snapshot.user_classifications.clone();
        self.data_type = Some(snapshot.data_type);
        self.current_name = Some(snapshot.name.clone());
        self.last_score = None;
        Ok(())
    }

    /// Start a fresh component; saved components are kept
    pub fn new_component(&mut self) {
        self.dataset = None;
        self.user_classifications.clear();
        self.data_type = None;
        self.current_name = None;
        self.last_score = None;
    }

    pub fn delete(&mut self, name: &str) -> EvaResult<ComponentSnapshot> {
        let removed = self
            .store
            .delete(name)
            .ok_or_else(|| StoreError::UnknownComponent(name.to_string()))?;

        if self.current_name.as_deref() == Some(name) {
            self.current_name = None;
        }
        Ok(removed)
    }

    pub fn total_ev(&self) -> TotalEvTable {
        self.store.aggregate()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn user_classifications(&self) -> &UserClassifications {
        &self.user_classifications
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn last_score(&self) -> Option<&ComponentScore> {
        self.last_score.as_ref()
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }
}
