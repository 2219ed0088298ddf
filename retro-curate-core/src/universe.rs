//! The record universe and its parent/clone equivalence classes.

use std::collections::{BTreeMap, HashMap};

use crate::error::CurateError;
use crate::record::{DumpRecord, MachineRecord, Mode, Record};
use crate::tags::base_name;

/// A parent and its clones, parent first, clones in loader order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceClass {
    members: Vec<String>,
}

impl EquivalenceClass {
    pub fn parent(&self) -> &str {
        &self.members[0]
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }
}

/// All records known for one filter, partitioned into classes.
///
/// Built once by a loader and read-only afterwards. Classes and plans refer
/// to records by identifier only.
#[derive(Debug, Clone)]
pub struct Universe {
    mode: Mode,
    records: HashMap<String, Record>,
    classes: Vec<EquivalenceClass>,
    class_index: HashMap<String, usize>,
    children: HashMap<String, Vec<String>>,
    /// Free-form description of where the records came from (DAT name, build).
    source: String,
}

impl Universe {
    /// Build a universe from records in loader order, linking clones to
    /// their parents.
    ///
    /// Fails when an identifier repeats, a parent reference is unresolvable,
    /// a clone's parent is itself a clone, or records of both modes are mixed.
    pub fn from_records(
        mode: Mode,
        records: Vec<Record>,
        source: impl Into<String>,
    ) -> Result<Self, CurateError> {
        let mut by_id: HashMap<String, Record> = HashMap::with_capacity(records.len());
        let mut order: Vec<String> = Vec::with_capacity(records.len());

        for record in records {
            if record.mode() != mode {
                return Err(CurateError::internal(format!(
                    "record '{}' is a {} record in a {} universe",
                    record.id(),
                    record.mode(),
                    mode
                )));
            }
            let id = record.id().to_string();
            if by_id.contains_key(&id) {
                return Err(CurateError::metadata(format!("duplicate record '{id}'")));
            }
            order.push(id.clone());
            by_id.insert(id, record);
        }

        let mut classes: Vec<EquivalenceClass> = Vec::new();
        let mut class_index: HashMap<String, usize> = HashMap::with_capacity(order.len());
        let mut children: HashMap<String, Vec<String>> = HashMap::new();

        for id in &order {
            let record = &by_id[id];
            if record.parent().is_none() {
                class_index.insert(id.clone(), classes.len());
                classes.push(EquivalenceClass {
                    members: vec![id.clone()],
                });
            }
        }

        for id in &order {
            let record = &by_id[id];
            let Some(parent) = record.parent() else {
                continue;
            };
            let Some(parent_record) = by_id.get(parent) else {
                return Err(CurateError::metadata(format!(
                    "'{id}' is a clone of '{parent}', which does not exist"
                )));
            };
            if let Some(grandparent) = parent_record.parent() {
                return Err(CurateError::metadata(format!(
                    "'{id}' is a clone of '{parent}', which is itself a clone of '{grandparent}'"
                )));
            }
            let idx = class_index[parent];
            classes[idx].members.push(id.clone());
            class_index.insert(id.clone(), idx);
            children
                .entry(parent.to_string())
                .or_default()
                .push(id.clone());
        }

        Ok(Self {
            mode,
            records: by_id,
            classes,
            class_index,
            children,
            source: source.into(),
        })
    }

    /// Build a console universe from dump records.
    pub fn from_dumps(
        dumps: Vec<DumpRecord>,
        source: impl Into<String>,
    ) -> Result<Self, CurateError> {
        let records = dumps.into_iter().map(Record::Dump).collect();
        Self::from_records(Mode::Console, records, source)
    }

    /// Build an arcade universe from machine records. Tags are derived
    /// from each description.
    pub fn from_machines(
        machines: Vec<MachineRecord>,
        source: impl Into<String>,
    ) -> Result<Self, CurateError> {
        let records = machines
            .into_iter()
            .map(|mut m| {
                m.refresh_tags();
                Record::Machine(m)
            })
            .collect();
        Self::from_records(Mode::Arcade, records, source)
    }

    /// Build a console universe without parent/clone metadata by grouping
    /// names that share the parenthesis-stripped base name.
    ///
    /// Classes are ordered by base name; within a class, members are sorted
    /// and the first becomes the parent.
    pub fn from_dump_names<I, S>(names: I, source: impl Into<String>) -> Result<Self, CurateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in names {
            let name = name.into();
            groups
                .entry(base_name(&name).to_string())
                .or_default()
                .push(name);
        }

        let mut dumps = Vec::new();
        for (_, mut members) in groups {
            members.sort();
            members.dedup();
            let parent = members[0].clone();
            for (i, member) in members.into_iter().enumerate() {
                let link = if i == 0 { None } else { Some(parent.clone()) };
                dumps.push(DumpRecord::new(member, link));
            }
        }

        Self::from_dumps(dumps, source)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn machine(&self, id: &str) -> Option<&MachineRecord> {
        self.records.get(id).and_then(Record::machine)
    }

    pub fn classes(&self) -> &[EquivalenceClass] {
        &self.classes
    }

    /// The class containing `id`.
    pub fn class_of(&self, id: &str) -> Option<&EquivalenceClass> {
        self.class_index.get(id).map(|&i| &self.classes[i])
    }

    /// Clones of `id`, empty for clones and childless parents.
    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Records in class order: each parent followed by its clones.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.classes
            .iter()
            .flat_map(|c| c.members.iter())
            .map(|id| &self.records[id])
    }
}
