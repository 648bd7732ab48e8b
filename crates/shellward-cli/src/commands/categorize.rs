//! Categorize command - show how commands are classified.

use colored::Colorize;
use serde_json::json;
use shellward_config::Config;
use shellward_core::{Categorization, CommandCategory};
use shellward_policy::Categorizer;
use shellward_runtime::config_bridge;

use crate::OutputFormat;
use crate::theme::Theme;

/// Classify each of `commands` with the configured rules and print the
/// per-command categories and the highest among them.
pub(crate) fn run_categorize(cfg: &Config, commands: &[String], format: OutputFormat) {
    let categorizer = Categorizer::new(config_bridge::to_category_rules(cfg));
    let results = categorizer.categorize_all(commands);
    let highest = categorizer.highest_risk_category(commands);

    match format {
        OutputFormat::Json => {
            let value = json!({
                "commands": commands
                    .iter()
                    .zip(&results)
                    .map(|(command, c)| json!({ "command": command, "categorization": c }))
                    .collect::<Vec<_>>(),
                "highest": highest,
            });
            println!("{value:#}");
        },
        OutputFormat::Pretty => print_table(commands, &results, highest),
    }
}

fn print_table(
    commands: &[String],
    results: &[Categorization],
    highest: CommandCategory,
) {
    println!("\n{}", Theme::header("Command Categories"));
    println!("{:<10} {}", "CATEGORY".dimmed(), "COMMAND".dimmed());
    println!("{}", Theme::separator());

    for (command, categorization) in commands.iter().zip(results) {
        let category = categorization.category();
        let padding = " ".repeat(10usize.saturating_sub(category.as_str().len()));
        let label = format!("{}{padding}", Theme::category(category));
        println!("{label} {command}");
        println!("{:<10} {}", "", Theme::dimmed(categorization.reason()));
    }

    println!("{}", Theme::separator());
    println!("{}", Theme::kv("Highest", &Theme::category(highest)));
    println!();
}
