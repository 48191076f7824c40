//! Structured summary of an XLSForm

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::reader::Record;

/// Everything the analyzer extracts from a workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormSummary {
    pub file: String,
    pub form_id: String,
    pub form_title: String,
    pub survey: SurveySummary,
    pub choices: ChoiceLists,
    pub settings: Record,
}

/// Survey rows sorted into (overlapping) buckets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurveySummary {
    pub fields: Vec<FieldDescriptor>,
    pub groups: Vec<GroupDescriptor>,
    pub date_fields: Vec<FieldDescriptor>,
    pub calculated_fields: Vec<FieldDescriptor>,
    pub select_fields: Vec<FieldDescriptor>,
    pub important_fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: String,
    /// Innermost open group, if any
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    /// Choice list referenced by a select type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices_list: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub group_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub name: String,
    pub label: String,
}

/// A named list of choices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceList {
    pub name: String,
    pub choices: Vec<Choice>,
}

/// Choice lists in order of first appearance; serialized as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceLists(Vec<ChoiceList>);

impl ChoiceLists {
    /// Append a choice, creating its list on first use
    pub fn push(&mut self, list_name: &str, choice: Choice) {
        match self.0.iter_mut().find(|l| l.name == list_name) {
            Some(list) => list.choices.push(choice),
            None => self.0.push(ChoiceList {
                name: list_name.to_string(),
                choices: vec![choice],
            }),
        }
    }

    pub fn get(&self, list_name: &str) -> Option<&[Choice]> {
        self.0
            .iter()
            .find(|l| l.name == list_name)
            .map(|l| l.choices.as_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChoiceList> {
        self.0.iter()
    }
}

impl Serialize for ChoiceLists {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for list in &self.0 {
            map.serialize_entry(&list.name, &list.choices)?;
        }
        map.end()
    }
}
