use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Row, Table};
use spendcast_core::calendar::Calendar;
use spendcast_core::models::RecordKind;
use spendcast_core::projection::Projection;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ViewRecord {
    pub id: Uuid,
    pub label: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub recurrence: Option<String>,
    pub detail: Option<String>,
    pub parent_id: Option<Uuid>,
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn format_date(date: DateTime<Utc>, calendar: &Calendar) -> String {
    date.with_timezone(&calendar.timezone())
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn amount_cell(amount: f64, kind: RecordKind) -> Cell {
    let cell = Cell::new(format!("{:.2}", amount)).set_alignment(CellAlignment::Right);
    match kind {
        RecordKind::Income => cell.fg(Color::Green),
        RecordKind::Expense => cell.fg(Color::Red),
    }
}

pub fn display_records(records: &[ViewRecord], kind: RecordKind, calendar: &Calendar) {
    if records.is_empty() {
        println!("No {}s found.", kind);
        return;
    }

    let detail_header = match kind {
        RecordKind::Income => "Status",
        RecordKind::Expense => "Category",
    };

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Amount", "Date", "When", "Recurrence", detail_header]);

    for record in records {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&record.id)));

        // Generated occurrences are indented under their series
        let name_cell = if record.parent_id.is_some() {
            Cell::new(format!("  ↳ {}", record.label)).fg(Color::DarkGrey)
        } else if record.recurrence.is_some() {
            Cell::new(format!("↻ {}", record.label)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&record.label)
        };
        row.add_cell(name_cell);

        row.add_cell(amount_cell(record.amount, kind));
        row.add_cell(Cell::new(format_date(record.date, calendar)));

        let when = Cell::new(record.date.humanize());
        row.add_cell(if record.date < Utc::now() {
            when.fg(Color::DarkGrey)
        } else {
            when
        });

        row.add_cell(Cell::new(record.recurrence.as_deref().unwrap_or("")));
        row.add_cell(Cell::new(record.detail.as_deref().unwrap_or("")));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_occurrences(dates: &[DateTime<Utc>], calendar: &Calendar) {
    if dates.is_empty() {
        println!("No occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Weekday"]);

    for (index, date) in dates.iter().enumerate() {
        let local = date.with_timezone(&calendar.timezone());
        table.add_row(vec![
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(format_date(*date, calendar)),
            Cell::new(local.format("%A")),
        ]);
    }

    println!("{table}");
}

pub fn display_projection(projection: &Projection, calendar: &Calendar) {
    if projection.occurrences.is_empty() {
        println!(
            "Nothing projected between {} and {}.",
            format_date(projection.window.start, calendar),
            format_date(projection.window.end, calendar)
        );
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Kind", "Name", "Amount", "Source"]);

    for occurrence in &projection.occurrences {
        table.add_row(vec![
            Cell::new(format_date(occurrence.date, calendar)),
            Cell::new(occurrence.kind),
            Cell::new(&occurrence.label),
            amount_cell(occurrence.amount, occurrence.kind),
            Cell::new(short_id(&occurrence.source_id)),
        ]);
    }

    println!("{table}");

    let totals = &projection.totals;
    let net = Cell::new(format!("{:.2}", totals.net)).set_alignment(CellAlignment::Right);
    let net = if totals.net < 0.0 {
        net.fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        net.fg(Color::Green).add_attribute(Attribute::Bold)
    };

    let mut summary = Table::new();
    summary.set_header(vec!["Occurrences", "Income", "Expenses", "Net"]);
    summary.add_row(vec![
        Cell::new(totals.count).set_alignment(CellAlignment::Right),
        amount_cell(totals.income, RecordKind::Income),
        amount_cell(totals.expenses, RecordKind::Expense),
        net,
    ]);
    println!("{summary}");
}
