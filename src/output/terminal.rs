// Colored terminal output for theme groups and run anomalies.

use std::collections::HashMap;

use colored::Colorize;

use crate::articles::Article;
use crate::themes::engine::AssignmentOverwriteAnomaly;
use crate::themes::ThemeGroups;

/// Display the theme groups, largest first, with a preview per article.
pub fn display_theme_groups(groups: &ThemeGroups, articles: &[Article]) {
    if groups.is_empty() {
        println!("No themes produced.");
        return;
    }

    let total: usize = groups.iter().map(|(_, ids)| ids.len()).sum();
    println!(
        "\n{}",
        format!("=== Themes ({} themes, {} articles) ===", groups.len(), total).bold()
    );

    let by_id: HashMap<&str, &Article> = articles.iter().map(|a| (a.id(), a)).collect();

    // Stable sort keeps first-use order among equal sizes.
    let mut ordered: Vec<_> = groups.iter().collect();
    ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    for (theme, ids) in ordered {
        println!("\n  {} {}", colorize_size(theme, ids.len()), format!("({})", ids.len()).dimmed());
        for id in ids {
            let preview = by_id
                .get(id.as_str())
                .map(|a| super::truncate_chars(a.summary(), 90))
                .unwrap_or_default();
            println!("    {:>5}  {}", id, preview.dimmed());
        }
    }
    println!();
}

/// Warn about articles that were reassigned during the run.
pub fn display_anomalies(anomalies: &[AssignmentOverwriteAnomaly]) {
    if anomalies.is_empty() {
        return;
    }
    println!(
        "  {} {} article(s) were reassigned by a later batch:",
        "!".yellow().bold(),
        anomalies.len()
    );
    for a in anomalies {
        println!(
            "    batch {}: {} {} -> {}",
            a.batch_index, a.article_id, a.previous.dimmed(), a.replacement
        );
    }
}

/// Singleton themes are the last-resort case, so they get dimmed.
fn colorize_size(theme: &str, size: usize) -> colored::ColoredString {
    match size {
        0 | 1 => theme.dimmed(),
        2..=4 => theme.normal().bold(),
        _ => theme.green().bold(),
    }
}
