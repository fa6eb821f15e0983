use crate::{
    data::{IdForm, form::FormValues},
    error::RosterResult,
    routes::dashboard::render_dashboard,
    state::RosterState,
};
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use maud::Markup;

pub async fn internal_get_new_student_form(
    State(state): State<RosterState>,
) -> RosterResult<Markup> {
    let mut controller = state.controller().await;
    controller.open_create_form()?;
    Ok(render_dashboard(&controller))
}

pub async fn internal_get_edit_student_form(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> RosterResult<Markup> {
    let mut controller = state.controller().await;
    controller.open_edit_form(id)?;
    Ok(render_dashboard(&controller))
}

/// Validates and submits the open form. The lock is released while the service call is pending,
/// and the call settles even if this request is dropped.
pub async fn internal_put_student_form(
    State(state): State<RosterState>,
    Form(values): Form<FormValues>,
) -> RosterResult<Markup> {
    let pending = {
        let mut controller = state.controller().await;
        controller.set_values(values)?;
        controller.begin_submit()?
    };

    if let Some(pending) = pending {
        if let Err(e) = state.spawn_submission(pending).await {
            error!(?e, "Student submission task failed");
        }
    }

    Ok(render_dashboard(&*state.controller().await))
}

pub async fn internal_post_cancel_student_form(
    State(state): State<RosterState>,
) -> RosterResult<Markup> {
    let mut controller = state.controller().await;
    controller.cancel_form()?;
    Ok(render_dashboard(&controller))
}

pub async fn internal_get_student_avatar(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> RosterResult<Redirect> {
    let avatar = state.controller().await.fallback_image(id)?;
    Ok(Redirect::temporary(&avatar))
}

pub async fn internal_post_clear_storage(
    State(state): State<RosterState>,
) -> RosterResult<Markup> {
    let mut controller = state.controller().await;
    controller.clear_roster()?;
    info!("Roster cleared");
    Ok(render_dashboard(&controller))
}
