//! Global session context and provider

use shelf_core::{SessionEvent, TokenStore, UserProfile};
use shelf_http::AuthenticatedShelfClient;
use std::rc::Rc;
use yew::prelude::*;

/// Session-derived UI state
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SessionState {
    pub signed_in: bool,
    /// Cached profile for display only; guards read token claims instead
    pub user: Option<UserProfile>,
}

impl SessionState {
    /// State as persisted by a previous visit. Signed in means an access
    /// token is stored, which is what the session guard checks first.
    pub fn restore(store: &TokenStore) -> Self {
        let signed_in = store.access_token().is_some();
        Self {
            signed_in,
            user: if signed_in { store.profile() } else { None },
        }
    }
}

/// Session state actions
pub enum SessionAction {
    /// The token store changed
    Event(SessionEvent),
    /// Re-read everything from the store
    Reload(SessionState),
}

impl Reducible for SessionState {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            SessionAction::Event(SessionEvent::TokenRefreshed) if self.signed_in => self,
            // Either event means an access token is now stored.
            SessionAction::Event(SessionEvent::SignedIn | SessionEvent::TokenRefreshed) => {
                Rc::new(Self {
                    signed_in: true,
                    ..(*self).clone()
                })
            }
            SessionAction::Event(SessionEvent::ProfileUpdated(user)) => Rc::new(Self {
                user: Some(user),
                ..(*self).clone()
            }),
            // Drop everything derived from the old session.
            SessionAction::Event(SessionEvent::SignedOut) => Rc::new(Self::default()),
            SessionAction::Reload(state) => Rc::new(state),
        }
    }
}

/// Session context handed to every view below [`SessionProvider`]
#[derive(Clone, PartialEq)]
pub struct SessionContext {
    pub client: AuthenticatedShelfClient,
    pub state: UseReducerHandle<SessionState>,
    /// Seconds before expiry at which guards refresh early
    pub expiry_leeway_secs: i64,
}

impl SessionContext {
    pub fn store(&self) -> &TokenStore {
        self.client.store()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.signed_in
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.state.user.as_ref()
    }

    /// Clear the session; subscribed views reset through the store's events
    pub fn sign_out(&self) {
        self.client.sign_out();
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub client: AuthenticatedShelfClient,
    #[prop_or_default]
    pub expiry_leeway_secs: i64,
    pub children: Children,
}

/// Session provider component
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let state = {
        let store = props.client.store().clone();
        use_reducer(move || SessionState::restore(&store))
    };

    // Follow store changes made anywhere in the app
    {
        let state = state.clone();
        use_effect_with(props.client.clone(), move |client| {
            let store = client.store().clone();
            state.dispatch(SessionAction::Reload(SessionState::restore(&store)));

            let id = {
                let state = state.clone();
                store.subscribe(move |event| state.dispatch(SessionAction::Event(event.clone())))
            };

            // Cleanup on unmount
            move || store.unsubscribe(id)
        });
    }

    let context = SessionContext {
        client: props.client.clone(),
        state,
        expiry_leeway_secs: props.expiry_leeway_secs,
    };

    html! {
        <ContextProvider<SessionContext> context={context}>
            {props.children.clone()}
        </ContextProvider<SessionContext>>
    }
}

/// Hook to use session context
#[hook]
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
        .expect("SessionContext not found. Make sure to wrap your component with SessionProvider")
}

/// Hook to get the cached user, if any
#[hook]
pub fn use_current_user() -> Option<UserProfile> {
    let session = use_session();
    session.state.user.clone()
}
