use crate::error::ReasonerError;
use crate::ontology::Ontology;
use crate::taxonomy::TaxonomyEntry;
use ontoquad_model::{Identified, IdentityHash};
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The part of an ontology an [Evidence] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvidenceCategory {
    ClassModel,
    PropertyModel,
    Data,
}

impl Display for EvidenceCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EvidenceCategory::ClassModel => "ClassModel",
            EvidenceCategory::PropertyModel => "PropertyModel",
            EvidenceCategory::Data => "Data",
        };
        f.write_str(name)
    }
}

/// A single inference: the new entry and the rule that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Evidence {
    category: EvidenceCategory,
    provenance: String,
    entry: TaxonomyEntry,
}

impl Evidence {
    /// Creates a new evidence. The entry is marked as inferred.
    pub fn new(
        category: EvidenceCategory,
        provenance: impl Into<String>,
        entry: TaxonomyEntry,
    ) -> Self {
        Self {
            category,
            provenance: provenance.into(),
            entry: entry.mark_inferred(),
        }
    }

    pub fn category(&self) -> EvidenceCategory {
        self.category
    }

    /// The name of the rule that produced this evidence.
    pub fn provenance(&self) -> &str {
        &self.provenance
    }

    pub fn entry(&self) -> &TaxonomyEntry {
        &self.entry
    }
}

impl Display for Evidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.provenance, self.entry)
    }
}

/// The evidences collected by a single reasoning run.
///
/// Evidences can only be appended. The collection is guarded by a lock, so rules that run in
/// parallel may share a report.
#[derive(Debug)]
pub struct ReasoningReport {
    ontology: IdentityHash,
    evidences: Mutex<Vec<Evidence>>,
    fixpoint_passes: usize,
}

impl ReasoningReport {
    pub fn new(ontology: IdentityHash) -> Self {
        Self {
            ontology,
            evidences: Mutex::new(Vec::new()),
            fixpoint_passes: 0,
        }
    }

    /// The identity of the ontology this report belongs to.
    pub fn ontology(&self) -> IdentityHash {
        self.ontology
    }

    pub fn add_evidence(&self, evidence: Evidence) {
        lock(&self.evidences).push(evidence);
    }

    pub fn add_evidences(&self, evidences: impl IntoIterator<Item = Evidence>) {
        lock(&self.evidences).extend(evidences);
    }

    /// Returns a copy of the evidences in the order they were added.
    pub fn evidences(&self) -> Vec<Evidence> {
        lock(&self.evidences).clone()
    }

    pub fn evidences_of(&self, category: EvidenceCategory) -> Vec<Evidence> {
        lock(&self.evidences)
            .iter()
            .filter(|evidence| evidence.category == category)
            .cloned()
            .collect()
    }

    pub fn into_evidences(self) -> Vec<Evidence> {
        self.evidences
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        lock(&self.evidences).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.evidences).is_empty()
    }

    /// The number of passes of the fixpoint stage.
    pub fn fixpoint_passes(&self) -> usize {
        self.fixpoint_passes
    }

    pub(crate) fn set_fixpoint_passes(&mut self, passes: usize) {
        self.fixpoint_passes = passes;
    }

    /// Inserts the entries of all evidences into `ontology`. Returns the number of entries that
    /// were new to the ontology.
    pub fn join_evidences(&self, ontology: &mut Ontology) -> Result<usize, ReasonerError> {
        if ontology.identity() != self.ontology {
            return Err(ReasonerError::ValidationReportMismatch {
                ontology: ontology.identity(),
                report: self.ontology,
            });
        }

        let evidences = lock(&self.evidences);
        Ok(evidences
            .iter()
            .filter(|evidence| ontology.insert(evidence.entry.clone()))
            .count())
    }
}

/// Locks `mutex`, recovering a poisoned lock.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
