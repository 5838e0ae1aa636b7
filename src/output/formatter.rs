use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::contest::{Contest, ContestStatus, Criterion, Phase, RatingSet};
use crate::rating::JuryProgress;
use crate::scoring::RankedEntry;
use crate::service::{ContestSummary, HistoryEntry, JuryEntry};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with one decimal place.
/// If incomplete is true, appends asterisk to indicate partial ratings
pub fn format_score(score: f64, incomplete: bool) -> String {
    if incomplete {
        format!("{:.1}*", score)
    } else {
        format!("{:.1}", score)
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked results as one block per nomination.
/// Rows: place, score (right-aligned, 6 chars), title, author
pub fn format_results_table(ranked: &[RankedEntry], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No results.".to_string();
    }

    let term_width = get_terminal_width();
    let place_width = 4;
    let score_width = 6;
    let separator = "  ";

    let mut lines = Vec::new();
    let mut current_nomination: Option<&str> = None;

    for row in ranked {
        let nomination = row.entry.nomination.as_str();
        if current_nomination != Some(nomination) {
            if current_nomination.is_some() {
                lines.push(String::new());
            }
            lines.push(if use_colors {
                nomination.bold().to_string()
            } else {
                nomination.to_string()
            });
            current_nomination = Some(nomination);
        }

        let place_str = format!("{:>3}.", row.place);
        let score_str = format!(
            "{:>width$}",
            format_score(row.score, row.incomplete),
            width = score_width
        );
        let author = row
            .entry
            .author
            .as_ref()
            .map(|a| a.full_name.as_str())
            .unwrap_or("-");

        let fixed_width =
            place_width + 1 + score_width + separator.len() * 2 + author.chars().count();
        let title = match term_width {
            Some(width) if width > fixed_width + 10 => {
                truncate_title(&row.entry.title, width - fixed_width)
            }
            Some(_) => truncate_title(&row.entry.title, 20),
            None => row.entry.title.clone(),
        };

        let line = if use_colors {
            let place = match row.place {
                1..=3 => place_str.yellow().bold().to_string(),
                _ => place_str.dimmed().to_string(),
            };
            format!(
                "{} {}{}{}{}{}",
                place,
                score_str.bold(),
                separator,
                title,
                separator,
                author.cyan()
            )
        } else {
            format!(
                "{} {}{}{}{}{}",
                place_str, score_str, separator, title, separator, author
            )
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Format a duration into a human-readable remaining-time string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_remaining(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "<1m".to_string()
        }
    }
}

/// One-line description of where a contest stands
pub fn format_status(contest: &Contest, status: &ContestStatus, now: DateTime<Utc>) -> String {
    match status.phase() {
        Phase::Submission => format!(
            "Submissions open, closes in {} (rating until {})",
            format_remaining(contest.submission_deadline - now),
            contest.rating_deadline.format("%Y-%m-%d %H:%M UTC")
        ),
        Phase::RatingOnly => format!(
            "Rating only, closes in {}",
            format_remaining(contest.rating_deadline - now)
        ),
        Phase::Finished => format!(
            "Finished on {}",
            contest.rating_deadline.format("%Y-%m-%d %H:%M UTC")
        ),
    }
}

/// Format a contest summary as one line:
/// "{id} | {name} | {status} | {rated}/{total} rated | {n} jurors"
pub fn format_contest_summary(
    summary: &ContestSummary,
    now: DateTime<Utc>,
    use_colors: bool,
) -> String {
    let contest = &summary.contest;
    let status_str = format_status(contest, &summary.status, now);
    let counts = format!(
        "{}/{} rated | {} {}",
        summary.rated_entries,
        summary.total_entries,
        summary.jury_size(),
        if summary.jury_size() == 1 { "juror" } else { "jurors" }
    );

    if use_colors {
        let status_str = match summary.status.phase() {
            Phase::Submission => status_str.green().to_string(),
            Phase::RatingOnly => status_str.yellow().to_string(),
            Phase::Finished => status_str.dimmed().to_string(),
        };
        format!(
            "{} | {} | {} | {}",
            contest.id.dimmed(),
            contest.name.bold(),
            status_str,
            counts
        )
    } else {
        format!("{} | {} | {} | {}", contest.id, contest.name, status_str, counts)
    }
}

/// Verbose view of one ranked entry: the score and each juror's total
pub fn format_ranked_detail(row: &RankedEntry, use_colors: bool) -> String {
    let heading = format!("{}. {} ({})", row.place, row.entry.title, row.entry.nomination);
    let mut lines = vec![
        if use_colors {
            heading.bold().to_string()
        } else {
            heading
        },
        format!("  Score: {}", format_score(row.score, row.incomplete)),
    ];

    if row.breakdown.jurors.is_empty() {
        lines.push("  No ratings".to_string());
    }
    for juror in &row.breakdown.jurors {
        lines.push(format!(
            "  {}: {} ({} criteria)",
            juror.juror_id, juror.total, juror.criteria_rated
        ));
    }

    lines.join("\n")
}

/// Format a rating-set against the contest criteria, "-" for unrated ones
/// Format: "originality=8 composition=- technical=7 (2/3)"
pub fn format_rating_set(criteria: &[Criterion], ratings: &RatingSet) -> String {
    let values = criteria
        .iter()
        .map(|c| match ratings.get(&c.id) {
            Some(v) => format!("{}={}", c.id, v),
            None => format!("{}=-", c.id),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let filled = criteria.iter().filter(|c| ratings.get(&c.id).is_some()).count();
    format!("{} ({}/{})", values, filled, criteria.len())
}

/// Format the jury view of a contest: one line per entry with a rating marker
/// "[x]" complete, "[~]" partial, "[ ]" not rated
pub fn format_jury_entries(
    entries: &[JuryEntry],
    criteria: &[Criterion],
    use_colors: bool,
) -> String {
    if entries.is_empty() {
        return "No entries to rate.".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let (marker, total) = match &entry.my_ratings {
                Some(r) if r.is_complete(criteria) => ("[x]", Some(r.total())),
                Some(r) if !r.is_empty() => ("[~]", Some(r.total())),
                _ => ("[ ]", None),
            };
            let total = total.map(|t| format!("  {}", t)).unwrap_or_default();
            let index_str = format!("{:>3}.", idx + 1);
            if use_colors {
                format!(
                    "{} {} {} ({}) {}{}",
                    index_str.dimmed(),
                    marker,
                    entry.title.bold(),
                    entry.nomination.cyan(),
                    entry.id.dimmed(),
                    total
                )
            } else {
                format!(
                    "{} {} {} ({}) {}{}",
                    index_str, marker, entry.title, entry.nomination, entry.id, total
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a juror's rating history: each rated entry with its values per
/// criterion ("-" when unset) and the juror's average
pub fn format_history(
    entries: &[HistoryEntry],
    criteria: &[Criterion],
    use_colors: bool,
) -> String {
    if entries.is_empty() {
        return "No rated entries.".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let index_str = format!("{:>3}.", idx + 1);
            let average = format!("avg {:.1}", entry.average);
            let heading = if use_colors {
                format!(
                    "{} {} ({}) {}  {}",
                    index_str.dimmed(),
                    entry.title.bold(),
                    entry.nomination.cyan(),
                    entry.id.dimmed(),
                    average.bold()
                )
            } else {
                format!(
                    "{} {} ({}) {}  {}",
                    index_str, entry.title, entry.nomination, entry.id, average
                )
            };
            let values = criteria
                .iter()
                .map(|c| match entry.my_ratings.get(&c.id) {
                    Some(v) => format!("{}: {}", c.name, v),
                    None => format!("{}: -", c.name),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}\n     {}", heading, values)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "Rated 3 of 5" or "All 5 entries rated"
pub fn format_progress(progress: &JuryProgress) -> String {
    if progress.total > 0 && progress.is_done() {
        format!("All {} entries rated", progress.total)
    } else {
        format!("Rated {} of {}", progress.rated, progress.total)
    }
}
