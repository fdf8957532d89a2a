//! Database schema definitions

/// SQL to create the groups table
pub const CREATE_GROUPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
)
"#;

/// SQL to create the curricula table (curriculum year)
pub const CREATE_CURRICULA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS curricula (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
)
"#;

/// SQL to create the sciences table (science area)
pub const CREATE_SCIENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sciences (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
)
"#;

/// SQL to create the students table.
/// References are checked on insert; deleting a student never cascades.
pub const CREATE_STUDENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    group_id INTEGER NOT NULL REFERENCES groups(id),
    curriculum_id INTEGER NOT NULL REFERENCES curricula(id),
    science_id INTEGER NOT NULL REFERENCES sciences(id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_students_group ON students(group_id)",
    "CREATE INDEX IF NOT EXISTS idx_students_science ON students(science_id)",
    "CREATE INDEX IF NOT EXISTS idx_students_curriculum ON students(curriculum_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_GROUPS_TABLE,
        CREATE_CURRICULA_TABLE,
        CREATE_SCIENCES_TABLE,
        CREATE_STUDENTS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
