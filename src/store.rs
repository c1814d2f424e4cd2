// In-memory case registry with JSON persistence.
//
// Cases are keyed by a monotonically increasing id. The whole store is
// saved and loaded as one JSON document; a missing file on load means an
// empty store, not an error.
use crate::error::ReviewError;
use crate::types::{Case, CaseStatus};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct CaseStore {
    next_id: u64,
    cases: BTreeMap<u64, Case>,
}

impl Default for CaseStore {
    fn default() -> Self {
        CaseStore {
            next_id: 1,
            cases: BTreeMap::new(),
        }
    }
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ReviewError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ReviewError> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    pub fn create_case(&mut self, name: String, country: String, sector: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.cases.insert(id, Case::new(id, name, country, sector));
        id
    }

    pub fn get(&self, id: u64) -> Result<&Case, ReviewError> {
        self.cases.get(&id).ok_or(ReviewError::CaseNotFound(id))
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut Case, ReviewError> {
        self.cases
            .get_mut(&id)
            .ok_or(ReviewError::CaseNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Case> {
        self.cases.values()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Record the committee decision on a case. Only "approve" and
    /// "reject" are accepted; anything else leaves the case untouched.
    pub fn record_decision(&mut self, id: u64, decision: &str) -> Result<CaseStatus, ReviewError> {
        let status = match decision.trim().to_lowercase().as_str() {
            "approve" | "approved" => CaseStatus::Approved,
            "reject" | "rejected" => CaseStatus::Rejected,
            other => return Err(ReviewError::InvalidDecision(other.to_string())),
        };
        let case = self
            .cases
            .get_mut(&id)
            .ok_or(ReviewError::CaseNotFound(id))?;
        case.status = status;
        case.updated_at = Utc::now();
        Ok(status)
    }
}
