// Terminal rendering of extracted topics.

use colored::Colorize;

use crate::topics::pipeline::Topic;

/// Display ranked topics as a count-scaled bar list.
///
/// Scannable output for eyeballing whether the extraction makes sense:
/// biggest conversations first, bar length proportional to the largest.
pub fn display_topics(topics: &[Topic]) {
    if topics.is_empty() {
        return;
    }

    println!("\n{}", "=== Topics ===".bold());
    println!();

    let bar_width: usize = 30;
    let max_count = topics.iter().map(|t| t.count).max().unwrap_or(1).max(1);

    for (i, topic) in topics.iter().enumerate() {
        let filled = (topic.count * bar_width).div_ceil(max_count);
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled),
            " ".repeat(bar_width.saturating_sub(filled))
        );

        let colored_bar = if topic.count * 4 >= max_count * 3 {
            bar.bright_green()
        } else if topic.count * 4 >= max_count {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  {:>2}. {:<30} {} {}",
            i + 1,
            topic.label.bold(),
            colored_bar,
            format!("{} messages", topic.count).dimmed()
        );
    }
    println!();
}
