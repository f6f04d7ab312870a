use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Element name to completion percentage. Persisted as a JSON object whose
/// key order is the order in which elements were first recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress(Vec<(String, f64)>);

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrites an existing element in place, otherwise appends it.
    pub fn set(&mut self, element: String, percent: f64) {
        match self.0.iter_mut().find(|(name, _)| *name == element) {
            Some(entry) => entry.1 = percent,
            None => self.0.push((element, percent)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(name, percent)| (name.as_str(), *percent))
    }
}

impl Serialize for Progress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (element, percent) in &self.0 {
            map.serialize_entry(element, percent)?;
        }
        map.end()
    }
}

struct ProgressVisitor;

impl<'de> Visitor<'de> for ProgressVisitor {
    type Value = Progress;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of element names to percentages")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Progress, A::Error> {
        let mut progress = Progress::new();
        while let Some((element, percent)) = access.next_entry::<String, f64>()? {
            progress.set(element, percent);
        }
        Ok(progress)
    }
}

impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ProgressVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentRef {
    pub title: String,
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskRef {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub done: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InterimClaim {
    pub number: u32,
    pub amount: f64,
    pub claimed_on: NaiveDate,
}

/// Input for `ProjectRegistry::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub client: String,
    pub contract_value: f64,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProjectRecord {
    pub name: String,
    pub client: String,
    pub contract_value: f64,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub tasks: Vec<TaskRef>,
    #[serde(default)]
    pub interim_claims: Vec<InterimClaim>,
}

impl ProjectRecord {
    pub fn new(project: NewProject) -> Self {
        Self {
            name: project.name,
            client: project.client,
            contract_value: project.contract_value,
            location: project.location,
            start_date: project.start_date,
            end_date: project.end_date,
            progress: Progress::new(),
            documents: Vec::new(),
            tasks: Vec::new(),
            interim_claims: Vec::new(),
        }
    }
}
