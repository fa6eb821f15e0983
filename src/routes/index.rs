use crate::{routes::dashboard::render_dashboard, state::RosterState};
use axum::extract::State;
use maud::Markup;

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    let dashboard = render_dashboard(&*state.controller().await);
    state.render(dashboard)
}
