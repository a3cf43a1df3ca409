// HTML rendering for the table pages and the search form.
//
// Small hand-built pages; every piece of player data passes through
// `escape` before landing in markup.

use crate::config::TeamTable;
use crate::player::PlayerRecord;

/// Table headings paired positionally with the display row's fields (the
/// leading identifier column is not rendered).
pub const HEADINGS: [&str; 9] = [
    "Name",
    "Position",
    "Team",
    "Last Year's Points",
    "Projected Points",
    "Projected Points Deviation",
    "Games Played Last Year",
    "Player Contract",
    "Percent Guaranteed",
];

/// Escape text for use in HTML element content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shared page shell with the site navigation.
fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n\
         <nav><a href=\"/\">All Players</a> | <a href=\"/risky\">Risky Players</a> | \
         <a href=\"/salary\">By Salary</a> | <a href=\"/search\">Search</a></nav>\n\
         {body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn heading_row() -> String {
    let cells: String = HEADINGS
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    format!("<tr>{cells}</tr>")
}

fn player_row(player: &PlayerRecord) -> String {
    let row = player.display_row();
    // Skip the identifier; the remaining nine fields pair with HEADINGS.
    let cells: String = row[1..]
        .iter()
        .map(|value| format!("<td>{}</td>", escape(value)))
        .collect();
    format!("<tr>{cells}</tr>")
}

/// A full table page over the given players.
pub fn table_page(title: &str, players: &[PlayerRecord]) -> String {
    let mut rows = String::new();
    rows.push_str(&heading_row());
    for player in players {
        rows.push_str(&player_row(player));
    }
    page(title, &format!("<table border=\"1\">{rows}</table>"))
}

/// The search form: last name, position, and a team dropdown built from the
/// configured team table.
pub fn search_page(teams: &TeamTable) -> String {
    let mut options = String::new();
    for abbr in teams.abbreviations() {
        let escaped = escape(abbr);
        options.push_str(&format!("<option value=\"{escaped}\">{escaped}</option>"));
    }
    let body = format!(
        "<form action=\"/handle_search\" method=\"post\">\n\
         <label>Last name: <input type=\"text\" name=\"name\"></label><br>\n\
         <label>Position: <input type=\"text\" name=\"pos\"></label><br>\n\
         <label>Team: <select name=\"team\">{options}</select></label><br>\n\
         <button type=\"submit\">Search</button>\n\
         </form>"
    );
    page("Player Search", &body)
}

/// Result page for a successful lookup: a one-row table for the found player.
pub fn search_result_page(player: &PlayerRecord) -> String {
    table_page("Search Result", std::slice::from_ref(player))
}

/// Miss page: a human-readable message with a link back to the search form.
pub fn not_found_page() -> String {
    page(
        "Player Not Found",
        "<p>Player not found, please check spelling or search for a different player \
         <a href=\"/search\">here</a>.</p>",
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
