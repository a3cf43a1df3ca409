// HTTP presentation layer.
//
// The application state is assembled once, before the listener starts, and
// is shared read-only behind an `Arc` afterwards. Request handlers only
// ever call `search` and render pre-computed lists, which is the whole
// concurrency contract the lookup index requires.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tracing::info;

use crate::config::TeamTable;
use crate::index::PlayerIndex;
use crate::player::{self, PlayerRecord};
use crate::sources::{composite_key, MergedEntry};
use crate::views;

/// Everything the route handlers read: the lookup index plus the
/// pre-computed list views.
pub struct AppState {
    pub index: PlayerIndex,
    pub players: Vec<PlayerRecord>,
    pub risky: Vec<PlayerRecord>,
    pub by_salary: Vec<PlayerRecord>,
    pub teams: TeamTable,
}

/// Wrap every merged entry into a record, build the lookup index in
/// mapping-iteration order, and pre-compute the list pages.
pub fn build_state(entries: &HashMap<String, MergedEntry>, teams: TeamTable) -> AppState {
    let players: Vec<PlayerRecord> = entries
        .iter()
        .map(|(key, entry)| PlayerRecord::from_entry(key, entry))
        .collect();

    let index = PlayerIndex::build(players.iter().cloned());
    let risky = player::risky_players(&players);
    let by_salary = player::sorted_by_contract_value(&players);

    AppState {
        index,
        players,
        risky,
        by_salary,
        teams,
    }
}

/// Build the router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/risky", get(risky))
        .route("/salary", get(salary))
        .route("/search", get(search_form))
        .route("/handle_search", post(handle_search))
        .with_state(state)
}

/// Bind and serve until the process is interrupted.
pub async fn serve(state: Arc<AppState>, bind: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("serving on http://{addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::table_page("All Players", &state.players))
}

async fn risky(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::table_page("Risky Players", &state.risky))
}

async fn salary(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::table_page("Players by Salary", &state.by_salary))
}

async fn search_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::search_page(&state.teams))
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    name: String,
    pos: String,
    team: String,
}

/// Case-fold the form fields into the composite key and point-query the
/// index. A miss is a normal page, not an error.
async fn handle_search(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Html<String> {
    let key = composite_key(form.name.trim(), form.pos.trim(), form.team.trim());
    info!("search for key '{key}'");
    match state.index.search(&key) {
        Some(player) => Html(views::search_result_page(player)),
        None => Html(views::not_found_page()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, pos: &str, team: &str, total: f64) -> MergedEntry {
        MergedEntry {
            name: name.into(),
            position: pos.into(),
            team: team.into(),
            spreadsheet_total: total,
            projections: None,
            historic_points: None,
            games_played: None,
            contract: None,
        }
    }

    fn test_state() -> Arc<AppState> {
        let mut entries = HashMap::new();
        entries.insert(
            "allenqbbuf".to_string(),
            entry("Josh Allen", "QB", "Buf", 380.5),
        );
        entries.insert(
            "barkleyrbphi".to_string(),
            entry("Saquon Barkley", "RB", "Phi", 290.2),
        );

        let mut by_name = HashMap::new();
        by_name.insert("Bills".to_string(), "Buf".to_string());
        by_name.insert("Eagles".to_string(), "Phi".to_string());

        Arc::new(build_state(&entries, TeamTable::new(by_name)))
    }

    #[test]
    fn state_holds_one_record_per_entry() {
        let state = test_state();
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.index.len(), 2);
        assert!(state.index.search("allenqbbuf").is_some());
        assert!(state.index.search("mahomesqbkc").is_none());
        // No games-played data, so both land on the risky page.
        assert_eq!(state.risky.len(), 2);
    }

    #[tokio::test]
    async fn home_page_lists_every_player() {
        let Html(html) = home(State(test_state())).await;
        assert!(html.contains("Josh Allen"));
        assert!(html.contains("Saquon Barkley"));
    }

    #[tokio::test]
    async fn search_hit_renders_the_player() {
        let form = SearchForm {
            name: "Allen".into(),
            pos: "QB".into(),
            team: "Buf".into(),
        };
        let Html(html) = handle_search(State(test_state()), Form(form)).await;
        assert!(html.contains("Josh Allen"));
        assert!(!html.contains("Player not found"));
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let form = SearchForm {
            name: "ALLEN".into(),
            pos: "qb".into(),
            team: "BUF".into(),
        };
        let Html(html) = handle_search(State(test_state()), Form(form)).await;
        assert!(html.contains("Josh Allen"));
    }

    #[tokio::test]
    async fn search_miss_renders_not_found_with_link() {
        let form = SearchForm {
            name: "Doe".into(),
            pos: "QB".into(),
            team: "Ari".into(),
        };
        let Html(html) = handle_search(State(test_state()), Form(form)).await;
        assert!(html.contains("Player not found"));
        assert!(html.contains("href=\"/search\""));
    }

    #[tokio::test]
    async fn search_form_offers_the_configured_teams() {
        let Html(html) = search_form(State(test_state())).await;
        assert!(html.contains("<option value=\"Buf\">"));
        assert!(html.contains("<option value=\"Phi\">"));
    }
}
