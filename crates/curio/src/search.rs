use anyhow::Result;
use clap::Args;
use colored::Colorize;
use curio_api::{ApiConfig, Lookup, QueryClient, Record, ResultEnvelope};
use indicatif::ProgressBar;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Args)]
pub struct SearchArgs {
    /// Facet to search (Title, Person, Culture, Technique, Medium)
    field: String,

    /// Facet value to match
    value: String,

    /// Print the raw result page as pretty JSON
    #[arg(long)]
    json: bool,
}

pub fn execute(args: SearchArgs) -> Result<()> {
    let config = ApiConfig::load()?;
    let client = QueryClient::new(config)?;

    if args.json {
        println!("{}", search_json(&client, &args.field, &args.value)?);
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(format!("Searching {}={}...", args.field, args.value));

    let envelope = client.lookup(&args.field, &args.value)?;
    spinner.finish_and_clear();
    log::debug!(
        "page {:?}/{:?}, {} records",
        envelope.info.page,
        envelope.info.pages,
        envelope.records.len()
    );

    if envelope.records.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    print_result_table(&envelope);
    Ok(())
}

fn search_json(client: &dyn Lookup, field: &str, value: &str) -> Result<String> {
    let envelope = client.lookup(field, value)?;
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn print_result_table(envelope: &ResultEnvelope) {
    let total = envelope.info.totalrecords.unwrap_or(envelope.records.len() as i64);
    println!(
        "{} {} records (showing {}):",
        "Found".green().bold(),
        total,
        envelope.records.len()
    );

    let widths = calculate_column_widths(&envelope.records);
    for record in &envelope.records {
        println!("{}", format_record_row(record, &widths));
    }

    if envelope.info.next.is_some() {
        println!("{}", "More pages available; use `curio browse` to page through.".dimmed());
    }
}

struct ColumnWidths {
    title: usize,
    dated: usize,
    culture: usize,
    people: usize,
}

fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

fn truncate_text(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let mut result = String::new();
    let mut width = 0;

    for ch in text.chars() {
        let char_width = ch.width().unwrap_or(0);
        if width + char_width + 3 > max_width {
            break;
        }
        result.push(ch);
        width += char_width;
    }

    result + "..."
}

fn format_column(text: &str, width: usize) -> String {
    format!("{:<width$}", truncate_text(text, width), width = width)
}

fn calc_col_width<'a, I>(items: I, min: usize, max: usize) -> usize
where
    I: Iterator<Item = &'a str>,
{
    items
        .map(|s| s.width())
        .max()
        .unwrap_or(min)
        .max(min)
        .min(max)
}

fn people_summary(record: &Record) -> String {
    record
        .people
        .iter()
        .filter_map(|p| p.displayname.as_deref())
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn calculate_column_widths(records: &[Record]) -> ColumnWidths {
    let terminal_width = get_terminal_width().saturating_sub(2);

    let title = calc_col_width(records.iter().map(|r| r.display_title()), 10, 40);
    let dated = calc_col_width(records.iter().filter_map(|r| r.dated.as_deref()), 5, 15);
    let culture = calc_col_width(records.iter().filter_map(|r| r.culture.as_deref()), 5, 20);
    // People get whatever is left after the fixed columns.
    let people = terminal_width
        .saturating_sub(title + dated + culture + 6)
        .clamp(10, 40);

    ColumnWidths {
        title,
        dated,
        culture,
        people,
    }
}

fn format_record_row(record: &Record, widths: &ColumnWidths) -> String {
    let title = format_column(record.display_title(), widths.title).bold();
    let dated = format_column(record.dated.as_deref().unwrap_or(""), widths.dated);
    let culture = format_column(record.culture.as_deref().unwrap_or(""), widths.culture).cyan();
    let people = format_column(&people_summary(record), widths.people).dimmed();
    format!("{}  {}  {}  {}", title, dated, culture, people)
}
