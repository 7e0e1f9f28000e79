use crate::ledger::summarize;
use crate::models::{GoalSummary, MovementEntry};
use crate::store::LedgerStore;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

const SUMMARY_HEADERS: [&str; 7] = [
    "id",
    "goal",
    "target",
    "accumulated",
    "remaining",
    "percentage",
    "status",
];

pub fn export_date(entry: &MovementEntry) -> String {
    entry.date.format("%d-%m-%Y").to_string()
}

pub fn percentage_label(summary: &GoalSummary) -> String {
    format!("{:.1}%", summary.percentage)
}

/// `DD-MM-YYYY — magnitude — note` per entry, joined with `; `.
pub fn history_text(entries: &[MovementEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} — {} — {}",
                export_date(entry),
                entry.requested_magnitude,
                entry.note
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn summary_cells(summary: &GoalSummary) -> [String; 7] {
    [
        summary.goal_id.to_string(),
        summary.label.clone(),
        summary.target.to_string(),
        summary.accumulated.to_string(),
        summary.remaining.to_string(),
        percentage_label(summary),
        summary.status.as_str().to_string(),
    ]
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn summary_csv<S: LedgerStore>(store: &S) -> String {
    let mut csv = SUMMARY_HEADERS.join(",");
    csv.push('\n');
    for summary in summarize(store) {
        let row: Vec<String> = summary_cells(&summary).iter().map(|c| csv_field(c)).collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

/// Workbook with a "Summary" sheet (one row per goal, history flattened into
/// a text column) and a "History" sheet (one row per entry). Signed deltas
/// are not exported.
pub fn summary_xlsx<S: LedgerStore>(store: &S) -> Result<Vec<u8>, XlsxError> {
    let bold = Format::new().set_bold();
    let summaries = summarize(store);

    let mut summary_sheet = Worksheet::new();
    summary_sheet.set_name("Summary")?;
    for (col, header) in SUMMARY_HEADERS.iter().chain(["history"].iter()).enumerate() {
        summary_sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (index, summary) in summaries.iter().enumerate() {
        let row = index as u32 + 1;
        let entries = store.load_entries(summary.goal_id);
        summary_sheet.write_number(row, 0, summary.goal_id as f64)?;
        summary_sheet.write_string(row, 1, summary.label.as_str())?;
        summary_sheet.write_number(row, 2, f64::from(summary.target))?;
        summary_sheet.write_number(row, 3, summary.accumulated as f64)?;
        summary_sheet.write_number(row, 4, summary.remaining as f64)?;
        summary_sheet.write_string(row, 5, percentage_label(summary).as_str())?;
        summary_sheet.write_string(row, 6, summary.status.as_str())?;
        summary_sheet.write_string(row, 7, history_text(&entries).as_str())?;
    }
    summary_sheet.set_column_width(1, 42.0)?;
    summary_sheet.set_column_width(7, 60.0)?;

    let mut history_sheet = Worksheet::new();
    history_sheet.set_name("History")?;
    for (col, header) in ["goal", "date", "amount", "note"].iter().enumerate() {
        history_sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    let mut row = 1u32;
    for summary in &summaries {
        for entry in store.load_entries(summary.goal_id) {
            history_sheet.write_string(row, 0, summary.label.as_str())?;
            history_sheet.write_string(row, 1, export_date(&entry).as_str())?;
            history_sheet.write_number(row, 2, entry.requested_magnitude as f64)?;
            history_sheet.write_string(row, 3, entry.note.as_str())?;
            row += 1;
        }
    }
    history_sheet.set_column_width(0, 42.0)?;
    history_sheet.set_column_width(3, 48.0)?;

    let mut workbook = Workbook::new();
    workbook.push_worksheet(summary_sheet);
    workbook.push_worksheet(history_sheet);
    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{create_goal, record_movement, Movement};
    use crate::models::LedgerData;
    use chrono::NaiveDate;

    fn movement(delta: i64, note: &str, day: u32) -> Movement {
        Movement {
            delta,
            note: note.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        }
    }

    fn sample() -> LedgerData {
        let mut data = LedgerData::default();
        let patrols = create_goal(&mut data, "Presence patrols, night shift", 184).unwrap();
        create_goal(&mut data, "Workshops", 1).unwrap();
        record_movement(&mut data, patrols.id, movement(3, "sector \"north\"", 2)).unwrap();
        record_movement(&mut data, patrols.id, movement(-1, "", 9)).unwrap();
        data
    }

    #[test]
    fn history_text_uses_magnitude_not_sign() {
        let data = sample();
        let text = history_text(&data.load_entries(1));
        assert_eq!(text, "02-06-2025 — 3 — sector \"north\"; 09-06-2025 — 1 — ");
    }

    #[test]
    fn csv_escapes_and_formats_percentage() {
        let csv = summary_csv(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,goal,target,accumulated,remaining,percentage,status");
        assert_eq!(lines[1], "1,\"Presence patrols, night shift\",184,2,182,1.1%,InProgress");
        assert_eq!(lines[2], "2,Workshops,1,0,1,0.0%,Pending");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_quotes_line_breaks_of_either_kind() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("two\r\nlines"), "\"two\r\nlines\"");
        assert_eq!(csv_field("carriage\rreturn"), "\"carriage\rreturn\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = summary_xlsx(&sample()).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }
}
