//! CSV export of the points table.

use crate::logic::standings::TableRow;
use crate::models::FormEntry;

/// Render the points table as CSV, one row per ranked team.
pub fn points_table_csv(rows: &[TableRow]) -> Result<String, csv::Error> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "Rank", "Team", "MP", "W", "L", "Pts", "NSM", "PS", "PC", "Form",
    ])?;
    for row in rows {
        w.write_record([
            row.rank.to_string(),
            row.team_name.clone(),
            row.matches_played.to_string(),
            row.wins.to_string(),
            row.losses.to_string(),
            row.points.to_string(),
            row.nsm.to_string(),
            row.points_scored.to_string(),
            row.points_conceded.to_string(),
            form_string(&row.recent_form),
        ])?;
    }
    let bytes = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn form_string(form: &[FormEntry]) -> String {
    form.iter()
        .map(|e| match e {
            FormEntry::W => 'W',
            FormEntry::L => 'L',
        })
        .collect()
}
