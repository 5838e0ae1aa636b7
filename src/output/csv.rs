use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use super::formatter::format_score;
use crate::contest::Contest;
use crate::scoring::RankedEntry;

const BOM: &str = "\u{feff}";
const DELIMITER: &str = ";";
const HEADER: [&str; 7] = ["Place", "Title", "Author", "Email", "Phone", "Nomination", "Score"];

/// Quote a field when it would otherwise break the row.
fn escape_field(field: &str) -> String {
    if field.contains(DELIMITER) || field.contains(['"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn join_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Render results as semicolon-separated text with a UTF-8 BOM and one
/// header row. Rows keep the order of `ranked`.
pub fn format_csv(ranked: &[RankedEntry]) -> String {
    let mut lines = Vec::with_capacity(ranked.len() + 1);
    lines.push(join_row(HEADER));

    for row in ranked {
        let author = row.entry.author.as_ref();
        lines.push(join_row([
            row.place.to_string(),
            row.entry.title.clone(),
            author.map(|a| a.full_name.clone()).unwrap_or_default(),
            author.map(|a| a.email.clone()).unwrap_or_default(),
            author.and_then(|a| a.phone.clone()).unwrap_or_default(),
            row.entry.nomination.clone(),
            format_score(row.score, false),
        ]));
    }

    format!("{}{}", BOM, lines.join("\n"))
}

/// Write the CSV export atomically.
pub fn write_csv(path: &Path, ranked: &[RankedEntry]) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(format_csv(ranked).as_bytes())
        .context("Failed to write CSV export")?;
    file.commit()
        .with_context(|| format!("Failed to save CSV export at {}", path.display()))?;
    Ok(())
}

/// File name for an export: "results-{contest name}.csv" with path
/// separators replaced. A contest without a name falls back to its id.
pub fn export_file_name(contest: &Contest) -> String {
    let label = if contest.name.trim().is_empty() {
        &contest.id
    } else {
        &contest.name
    };
    let safe: String = label
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("results-{}.csv", safe)
}
