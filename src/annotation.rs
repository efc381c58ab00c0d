use std::collections::{BTreeMap, BTreeSet};

use crate::error::AnnotatorError;

pub const CLOUD: &str = "AWS";
pub const CLOUD_SERVICE: &str = "WorkSpaces";

const FIXED_FIELDS: [&str; 4] = ["IP", "Cloud Service", "Cloud", "Location"];

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    fields: BTreeMap<String, String>,
}

impl AnnotationRecord {
    pub fn new(ip: &str, location: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("IP".to_string(), ip.to_string());
        fields.insert("Cloud Service".to_string(), CLOUD_SERVICE.to_string());
        fields.insert("Cloud".to_string(), CLOUD.to_string());
        fields.insert("Location".to_string(), location.to_string());
        AnnotationRecord { fields }
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A batch of annotation rows sharing one CSV header. The header is computed
/// over the whole batch before any row is serialized, so a tag key discovered
/// on a late record still gets a column (empty) in every earlier row.
#[derive(Debug)]
pub struct AnnotationBatch {
    records: Vec<AnnotationRecord>,
}

impl AnnotationBatch {
    pub fn new(records: Vec<AnnotationRecord>) -> Self {
        AnnotationBatch { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn header(&self) -> Vec<String> {
        let mut discovered = BTreeSet::new();
        for record in &self.records {
            for field in record.fields.keys() {
                if !FIXED_FIELDS.contains(&field.as_str()) {
                    discovered.insert(field.clone());
                }
            }
        }
        FIXED_FIELDS
            .iter()
            .map(|field| field.to_string())
            .chain(discovered)
            .collect()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, AnnotatorError> {
        let header = self.header();
        let rows = self.records.iter().map(|record| {
            header
                .iter()
                .map(|field| record.get(field).unwrap_or_default().to_string())
                .collect()
        });
        write_csv(&header, rows)
    }
}

pub fn write_csv<H, R>(header: &[H], rows: R) -> Result<Vec<u8>, AnnotatorError>
where
    H: AsRef<str>,
    R: Iterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header.iter().map(AsRef::as_ref))?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|error| AnnotatorError::CsvError(error.into_error().into()))
}
