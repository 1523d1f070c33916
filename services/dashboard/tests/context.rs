mod common;

use std::time::Duration;

use agri_core::query_key::SEASON_KEYS;
use agri_core::{Method, SeasonStatus, Selection, StateError};
use common::*;
use dashboard_lib::context::{AppContext, Role, Session};
use serde_json::json;

fn context(transport: std::sync::Arc<MockTransport>) -> AppContext {
    let (client, queries) = setup(transport);
    AppContext::new(client, queries)
}

#[tokio::test(start_paused = true)]
async fn empty_season_list_stays_unselected() {
    let transport = MockTransport::new();
    transport.respond(Method::Get, SEASONS, Ok(json!([])));
    let mut ctx = context(transport);

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    let state = view.wait_until(|s| s.is_loaded()).await.unwrap();

    assert_eq!(state.selection(), Selection::Unselected);
    assert!(view.selected_season().is_none());
}

#[tokio::test(start_paused = true)]
async fn first_eligible_season_is_selected_once() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        SEASONS,
        Ok(json!([
            season(1, "COMPLETED"),
            season(2, "ACTIVE"),
            season(3, "ACTIVE"),
        ])),
    );
    let mut ctx = context(transport);

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    let state = view.wait_until(|s| s.is_loaded()).await.unwrap();

    assert_eq!(state.selected_id(), Some(2));
    assert_eq!(view.selected_season().unwrap().season_name, "Season 2");

    // Another consumer of the same context sees the same selection.
    let other = ctx.season_selection().unwrap();
    assert_eq!(other.selected_id(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn no_eligible_season_leaves_the_selection_empty() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        SEASONS,
        Ok(json!([season(1, "COMPLETED"), season(2, "PLANNED")])),
    );
    let mut ctx = context(transport);

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    let state = view.wait_until(|s| s.is_loaded()).await.unwrap();

    assert_eq!(state.seasons().len(), 2);
    assert_eq!(state.selected_id(), None);
}

#[tokio::test(start_paused = true)]
async fn explicit_clear_survives_a_list_refresh() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        SEASONS,
        Ok(json!([season(1, "ACTIVE"), season(2, "PLANNED")])),
    );
    transport.respond(
        Method::Get,
        SEASONS,
        Ok(json!([season(1, "ACTIVE"), season(2, "PLANNED"), season(3, "ACTIVE")])),
    );
    let mut ctx = context(transport.clone());

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    view.wait_until(|s| s.selected_id() == Some(1)).await.unwrap();

    ctx.season_selection_control().unwrap().set_selected_id(None);
    assert_eq!(view.selected_id(), None);

    ctx.client().invalidate(&SEASON_KEYS.all());
    let state = view.wait_until(|s| s.seasons().len() == 3).await.unwrap();

    assert_eq!(state.selected_id(), None);
    assert_eq!(transport.calls(Method::Get, SEASONS), 2);
}

#[tokio::test(start_paused = true)]
async fn explicit_choice_is_kept_and_may_point_outside_the_list() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        SEASONS,
        Ok(json!([season(1, "ACTIVE"), season(2, "PLANNED")])),
    );
    let mut ctx = context(transport);

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    view.wait_until(|s| s.is_loaded()).await.unwrap();
    let control = ctx.season_selection_control().unwrap();

    control.set_selected_id(Some(2));
    assert_eq!(view.selected_season().unwrap().id, 2);

    control.set_selected_id(Some(99));
    assert_eq!(view.selected_id(), Some(99));
    assert!(view.selected_season().is_none());
}

#[tokio::test(start_paused = true)]
async fn reading_a_missing_provider_fails_fast() {
    let transport = MockTransport::new();
    let ctx = context(transport.clone());

    assert_eq!(
        ctx.season_selection().err().map(|e| e.to_string()),
        Some(StateError::MissingProvider("SeasonSelection").to_string())
    );
    assert!(matches!(
        ctx.season_selection_control(),
        Err(StateError::MissingProvider("SeasonSelection"))
    ));
    assert!(matches!(ctx.session(), Err(StateError::MissingProvider("Session"))));
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn view_reports_a_dropped_provider() {
    let transport = MockTransport::new();
    transport.respond(Method::Get, SEASONS, Ok(json!([season(1, "ACTIVE")])));
    let mut ctx = context(transport);

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    view.wait_until(|s| s.is_loaded()).await.unwrap();
    drop(ctx);

    let outcome = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if let Err(e) = view.changed().await {
                return e;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(outcome, StateError::MissingProvider("SeasonSelection"));
}

#[tokio::test(start_paused = true)]
async fn sign_out_clears_the_cache_and_the_selection() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        SEASONS,
        Ok(json!([season(1, "PLANNED"), season(2, "ACTIVE")])),
    );
    transport.respond(Method::Get, TASKS, Ok(envelope(page(vec![]))));
    let mut ctx = context(transport.clone());
    ctx.sign_in(Session {
        user_name: "amina".to_string(),
        role: Role::Farmer,
    });
    assert_eq!(ctx.session().unwrap().role, Role::Farmer);

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    view.wait_until(|s| s.selected_id() == Some(2)).await.unwrap();
    ctx.queries()
        .tasks
        .fetch_list(Default::default())
        .await
        .unwrap();
    ctx.season_selection_control()
        .unwrap()
        .set_selected_id(Some(1));

    let signed_out = ctx.sign_out().unwrap();
    assert_eq!(signed_out.user_name, "amina");
    assert!(ctx.session().is_err());
    assert_eq!(view.selected_id(), None);
    assert!(!view.current().is_loaded());
    // Only the observed season list survives, emptied.
    assert_eq!(ctx.client().len(), 1);
    assert!(ctx
        .client()
        .get_data::<Vec<agri_core::Season>>(&SEASON_KEYS.list(&()))
        .is_none());
}

#[tokio::test(start_paused = true)]
async fn signing_back_in_reloads_the_season_list() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        SEASONS,
        Ok(json!([season(1, "PLANNED"), season(2, "ACTIVE")])),
    );
    let mut ctx = context(transport.clone());
    let session = Session {
        user_name: "amina".to_string(),
        role: Role::Farmer,
    };
    ctx.sign_in(session.clone());

    let mut view = ctx.provide_season_selection(SeasonStatus::Active);
    view.wait_until(|s| s.selected_id() == Some(2)).await.unwrap();
    ctx.season_selection_control()
        .unwrap()
        .set_selected_id(Some(1));
    ctx.sign_out();
    assert!(!view.current().is_loaded());

    // Nothing but the sign-in asks for the list again.
    ctx.sign_in(session);
    let state = view.wait_until(|s| s.is_loaded()).await.unwrap();

    assert_eq!(state.selected_id(), Some(2));
    assert_eq!(state.seasons().len(), 2);
    assert_eq!(transport.calls(Method::Get, SEASONS), 2);
}
