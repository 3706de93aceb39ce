use anyhow::{Context, Result};
use colored::*;
use log::info;

use super::display_value;
use crate::config::Config;
use crate::config::options::{ListQuery, OptionEntry, OrderBy};

const HEADERS: [&str; 6] = ["Scope", "Option", "Last change", "Created at", "Value", "Autoload"];
const MAX_VALUE_WIDTH: usize = 60;

/// List the options of the current scope
///
/// # Arguments
/// * `config` - Open configuration
/// * `page` - 1-based page; out of range pages show the last one
/// * `per_page` - Options per page
/// * `order` - Comma-separated order fields, `-` prefix for descending
///
/// # Returns
/// * `Ok(())` - List displayed successfully
/// * `Err(anyhow::Error)` - Invalid order field or database error
pub async fn list_command(config: &Config, page: u32, per_page: u32, order: String) -> Result<()> {
    info!("Listing options: page {}, {} per page, order '{}'", page, per_page, order);

    let order = OrderBy::parse_list(&order).context("Invalid --order")?;
    let query = ListQuery::new().page(page).per_page(per_page).order(order);

    let mut options = config.manager(None);
    let result = options.list(&query).await?;

    if result.entries.is_empty() {
        println!("No options in scope {}.", options.scope());
        return Ok(());
    }

    let rows: Vec<[String; 6]> = result.entries.iter().map(table_row).collect();
    print_table(&rows);

    if result.pages > 1 {
        println!("\nPage {} of {}", result.page, result.pages);
    }
    println!("{}", format!("Total options: {}", result.total).dimmed());
    Ok(())
}

fn table_row(entry: &OptionEntry) -> [String; 6] {
    [
        entry.scope.to_string(),
        entry.key.clone(),
        entry.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        truncate(&display_value(&entry.value), MAX_VALUE_WIDTH),
        entry.autoload.to_string(),
    ]
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

fn column_widths(rows: &[[String; 6]]) -> [usize; 6] {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn print_table(rows: &[[String; 6]]) {
    let widths = column_widths(rows);

    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(title, width)| format!("{:<width$}", title, width = width))
        .collect();
    println!("{}", header.join(" | ").bold());

    let total_width = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
    println!("{}", "-".repeat(total_width));

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        println!("{}", cells.join(" | "));
    }
}
