//! Presentation state derived from the registry: ordering, filtering and
//! multi-select.

mod selection;
mod sort;

use serde::{Deserialize, Serialize};
use crate::core::JobStatus;

pub use selection::{Selection, deselect_all, select_all, selected_ids, toggle};
pub use sort::{sort_jobs, visible};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Reduction,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Compressing,
    Completed,
    Error,
}

impl StatusFilter {
    pub fn matches(&self, status: JobStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == JobStatus::Pending,
            Self::Compressing => status == JobStatus::Compressing,
            Self::Completed => status == JobStatus::Completed,
            Self::Error => status == JobStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
    Compact,
}

/// Sort, filter and layout choices; persisted with the other preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewPreferences {
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub filter: StatusFilter,
    pub view_mode: ViewMode,
}
