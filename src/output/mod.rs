pub mod csv;
pub mod formatter;

pub use csv::{export_file_name, format_csv, write_csv};
pub use formatter::{
    format_contest_summary, format_history, format_jury_entries, format_progress,
    format_ranked_detail, format_rating_set, format_remaining, format_results_table, format_score,
    format_status, should_use_colors,
};
