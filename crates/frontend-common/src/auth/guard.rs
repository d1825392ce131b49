//! Route guard components for protected views

use super::context::use_session;
use crate::components::LoadingSpinner;
use serde::{Deserialize, Serialize};
use shelf_core::{AdminGuard, GuardDecision, GuardState, SessionGuard};
use std::cell::Cell;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;
use yew_router::AnyRoute;

/// Query string attached to guard redirects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectQuery {
    pub message: String,
}

#[derive(Properties, PartialEq)]
pub struct GuardProps {
    pub children: Children,
}

/// Which check a guard component runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardKind {
    Session,
    Admin,
}

impl GuardKind {
    fn pending_label(self) -> &'static str {
        match self {
            Self::Session => "Checking your session...",
            Self::Admin => "Checking your permissions...",
        }
    }
}

/// Guard state as held by a component, restarted whenever the route changes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteGuard(GuardState);

pub enum RouteGuardAction {
    /// The guard is rendering for this path
    Begin(String),
    /// An evaluation started for `route` finished
    Resolve {
        route: String,
        decision: GuardDecision,
    },
}

impl RouteGuard {
    pub fn decision(&self) -> GuardDecision {
        self.0.decision()
    }
}

impl Reducible for RouteGuard {
    type Action = RouteGuardAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0.clone();
        let changed = match action {
            RouteGuardAction::Begin(route) => next.begin(&route),
            RouteGuardAction::Resolve { route, decision } => next.resolve_for(&route, decision),
        };
        if changed {
            Rc::new(Self(next))
        } else {
            self
        }
    }
}

/// Renders its children only for a signed-in user.
///
/// An expired access token is refreshed before deciding. Visitors without a
/// usable session are sent to the login page with a message. The check runs
/// again on every navigation, even when the router reuses this component.
#[function_component(RequireSession)]
pub fn require_session(props: &GuardProps) -> Html {
    let session = use_session();
    let route = use_current_path();
    let state = use_reducer(RouteGuard::default);

    {
        let state = state.clone();
        use_effect_with(route.clone(), move |route| {
            let route = route.clone();
            state.dispatch(RouteGuardAction::Begin(route.clone()));

            let mounted = Rc::new(Cell::new(true));
            {
                let mounted = mounted.clone();
                spawn_local(async move {
                    let decision = SessionGuard::new(session.store(), session.client.public())
                        .with_leeway(session.expiry_leeway_secs)
                        .evaluate()
                        .await;
                    // The view may be gone, or on another route, by the time the refresh returns.
                    if mounted.get() {
                        state.dispatch(RouteGuardAction::Resolve { route, decision });
                    }
                });
            }
            move || mounted.set(false)
        });
    }

    use_redirect_on_denial(route, state.decision());
    render_guarded(GuardKind::Session, state.decision(), props)
}

/// Renders its children only when the access token carries the staff claim.
///
/// Meant to sit inside [`RequireSession`]; denied visitors go to the home page.
#[function_component(RequireAdmin)]
pub fn require_admin(props: &GuardProps) -> Html {
    let session = use_session();
    let route = use_current_path();
    let state = use_reducer(RouteGuard::default);

    {
        let state = state.clone();
        use_effect_with(route.clone(), move |route| {
            state.dispatch(RouteGuardAction::Begin(route.clone()));
            state.dispatch(RouteGuardAction::Resolve {
                route: route.clone(),
                decision: AdminGuard::new(session.store()).evaluate(),
            });
        });
    }

    use_redirect_on_denial(route, state.decision());
    render_guarded(GuardKind::Admin, state.decision(), props)
}

/// Message carried by the last guard redirect, for the page it landed on
#[hook]
pub fn use_redirect_message() -> Option<String> {
    let location = use_location();
    location
        .and_then(|location| location.query::<RedirectQuery>().ok())
        .map(|query| query.message)
}

/// Current path, or an empty string outside a router
#[hook]
fn use_current_path() -> String {
    use_location()
        .map(|location| location.path().to_string())
        .unwrap_or_default()
}

#[hook]
fn use_redirect_on_denial(route: String, decision: GuardDecision) {
    let navigator = use_navigator();

    use_effect_with((route, decision), move |(_, decision)| {
        if let GuardDecision::Denied(reason) = decision {
            let query = RedirectQuery {
                message: reason.message().to_string(),
            };
            match navigator {
                Some(navigator) => {
                    let target = AnyRoute::new(reason.redirect_path());
                    if let Err(e) = navigator.push_with_query(&target, &query) {
                        warn!("Guard redirect to {} failed: {e:?}", reason.redirect_path());
                    }
                }
                None => warn!("Guard denied access outside of a router; cannot redirect"),
            }
        }
    });
}

fn render_guarded(kind: GuardKind, decision: GuardDecision, props: &GuardProps) -> Html {
    match decision {
        GuardDecision::Unknown => html! {
            <LoadingSpinner label={kind.pending_label()} />
        },
        GuardDecision::Allowed => html! { <>{ props.children.clone() }</> },
        GuardDecision::Denied(_) => html! {},
    }
}
