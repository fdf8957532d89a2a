pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, section, success, warn};
pub use table::{reference_table, stats_table, students_table};
pub use theme::{theme, Theme};
