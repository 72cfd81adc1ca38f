//! Resource lookup table and per-resource availability cursors.

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::interner::{IdIndex, NodeIdx};
use crate::models::{Resource, Task};

use super::shift_date;

/// Tracks when a resource is next free with a single cursor.
///
/// This is not a calendar: the cursor only moves forward, to the day after
/// the latest reservation, and gaps before it are never reused.
#[derive(Clone, Debug)]
pub struct ResourceSchedule {
    /// Resource id (for logging)
    pub resource_id: String,
    next_available: NaiveDate,
}

impl ResourceSchedule {
    /// Cursor starting at the resource's `available_from`, or `anchor` if unset.
    pub fn new(resource: &Resource, anchor: NaiveDate) -> Self {
        Self {
            resource_id: resource.id.clone(),
            next_available: resource.available_from.unwrap_or(anchor),
        }
    }

    /// Earliest date at or after `from` on which the resource is free.
    pub fn next_available_time(&self, from: NaiveDate) -> NaiveDate {
        from.max(self.next_available)
    }

    /// Mark the resource busy through `end` (inclusive).
    pub fn reserve(&mut self, end: NaiveDate) -> EngineResult<()> {
        let next = shift_date(end, 1)?;
        self.next_available = self.next_available.max(next);
        Ok(())
    }
}

/// Validated resource definitions addressed by dense index.
#[derive(Clone, Debug)]
pub struct ResourceTable {
    index: IdIndex,
    resources: Vec<Resource>,
    capacities: Vec<u32>,
}

impl ResourceTable {
    /// Index resources, rejecting duplicate ids and zero capacities.
    pub fn build(resources: &[Resource], default_capacity: u32) -> EngineResult<Self> {
        let mut index = IdIndex::with_capacity(resources.len());
        let mut capacities = Vec::with_capacity(resources.len());

        for resource in resources {
            if index.insert_unique(&resource.id).is_none() {
                return Err(EngineError::DuplicateResourceId(resource.id.clone()));
            }
            let capacity = resource.max_concurrent_tasks.unwrap_or(default_capacity);
            if capacity == 0 {
                return Err(EngineError::InvalidCapacity {
                    resource_id: resource.id.clone(),
                });
            }
            capacities.push(capacity);
        }

        Ok(Self {
            index,
            resources: resources.to_vec(),
            capacities,
        })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
        self.index.get(id)
    }

    pub fn id(&self, idx: NodeIdx) -> &str {
        self.index.resolve(idx)
    }

    pub fn resource(&self, idx: NodeIdx) -> &Resource {
        &self.resources[idx]
    }

    pub fn capacity(&self, idx: NodeIdx) -> u32 {
        self.capacities[idx]
    }

    /// Whether `[start, end]` lies inside the resource's availability window.
    pub fn within_window(&self, idx: NodeIdx, start: NaiveDate, end: NaiveDate) -> bool {
        let resource = &self.resources[idx];
        resource.available_from.map_or(true, |from| start >= from)
            && resource.available_to.map_or(true, |to| end <= to)
    }

    /// Fresh cursors for one scheduling call.
    pub fn cursors(&self, anchor: NaiveDate) -> Vec<ResourceSchedule> {
        self.resources
            .iter()
            .map(|r| ResourceSchedule::new(r, anchor))
            .collect()
    }

    /// Resolve each task's resource ids to indices, rejecting unknown ids.
    ///
    /// Repeated ids within one task collapse to a single requirement.
    pub fn resolve_task_resources(&self, tasks: &[Task]) -> EngineResult<Vec<Vec<NodeIdx>>> {
        tasks
            .iter()
            .map(|task| {
                let mut indices: Vec<NodeIdx> = Vec::with_capacity(task.resources.len());
                for resource_id in &task.resources {
                    let idx = self.index_of(resource_id).ok_or_else(|| {
                        EngineError::DanglingResource {
                            task_id: task.id.clone(),
                            missing_id: resource_id.clone(),
                        }
                    })?;
                    if !indices.contains(&idx) {
                        indices.push(idx);
                    }
                }
                Ok(indices)
            })
            .collect()
    }
}
