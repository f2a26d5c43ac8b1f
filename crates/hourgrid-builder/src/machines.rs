//! Machine column index

use std::collections::HashMap;

use hourgrid_core::{Machine, MachineId};

/// Column order and id/name lookup for the grid's machines
///
/// Columns follow input order. Duplicate ids are not merged: each still gets
/// its own column, but lookups resolve to the first one.
#[derive(Clone, Debug, Default)]
pub struct MachineIndex {
    ids: Vec<MachineId>,
    names: Vec<String>,
    by_id: HashMap<MachineId, usize>,
    by_name: HashMap<String, usize>,
}

impl MachineIndex {
    pub fn new(machines: &[Machine]) -> Self {
        let mut index = Self::default();
        for (column, machine) in machines.iter().enumerate() {
            index.ids.push(machine.id.clone());
            index.names.push(machine.name.clone());
            index.by_id.entry(machine.id.clone()).or_insert(column);
            index.by_name.entry(machine.name.clone()).or_insert(column);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[MachineId] {
        &self.ids
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn column_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}
