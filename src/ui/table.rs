use tabled::{settings::Style, Table, Tabled};

use crate::api::{RefEntry, StatisticsResponse, StudentRecord};

/// Placeholder for a reference that does not resolve
const MISSING: &str = "-";

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Curriculum")]
    curriculum: String,
    #[tabled(rename = "Science")]
    science: String,
}

impl From<&StudentRecord> for StudentRow {
    fn from(s: &StudentRecord) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            group: s.group_name.clone().unwrap_or_else(|| MISSING.to_string()),
            curriculum: s.curriculum_name.clone().unwrap_or_else(|| MISSING.to_string()),
            science: s.science_name.clone().unwrap_or_else(|| MISSING.to_string()),
        }
    }
}

#[derive(Tabled)]
struct RefRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Students")]
    count: u64,
}

pub fn students_table(students: &[StudentRecord]) -> String {
    if students.is_empty() {
        return String::new();
    }
    let rows: Vec<StudentRow> = students.iter().map(StudentRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn reference_table(entries: &[RefEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let rows: Vec<RefRow> = entries
        .iter()
        .map(|e| RefRow {
            id: e.id,
            name: e.name.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Two tables, per group and per science area, keyed by display name
pub fn stats_table(stats: &StatisticsResponse) -> (String, String) {
    let table = |counts: &std::collections::BTreeMap<String, u64>| {
        let rows: Vec<CountRow> = counts
            .iter()
            .map(|(name, count)| CountRow {
                name: name.clone(),
                count: *count,
            })
            .collect();
        Table::new(rows).with(Style::rounded()).to_string()
    };
    (table(&stats.by_group), table(&stats.by_science))
}
