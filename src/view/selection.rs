use crate::core::{JobId, JobPatch};
use crate::registry::JobRegistry;
use crate::utils::{CompressorError, CompressorResult};

/// The current non-empty selection, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<JobId>);

impl Selection {
    /// Fails with [`CompressorError::NothingSelected`] when no job is selected.
    pub fn current(registry: &JobRegistry) -> CompressorResult<Self> {
        let ids = selected_ids(registry);
        if ids.is_empty() {
            return Err(CompressorError::NothingSelected);
        }
        Ok(Self(ids))
    }

    pub fn ids(&self) -> &[JobId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn selected_ids(registry: &JobRegistry) -> Vec<JobId> {
    registry.iter().filter(|j| j.is_selected()).map(|j| j.id()).collect()
}

pub fn toggle(registry: &mut JobRegistry, id: JobId) -> CompressorResult<bool> {
    let selected = registry
        .get(id)
        .map(|j| !j.is_selected())
        .ok_or(CompressorError::NotFound(id))?;
    registry.update(id, JobPatch::selected(selected))?;
    Ok(selected)
}

pub fn select_all(registry: &mut JobRegistry) {
    set_all(registry, true);
}

pub fn deselect_all(registry: &mut JobRegistry) {
    set_all(registry, false);
}

fn set_all(registry: &mut JobRegistry, selected: bool) {
    for id in registry.ids() {
        // Ids come straight from the registry
        let _ = registry.update(id, JobPatch::selected(selected));
    }
}
