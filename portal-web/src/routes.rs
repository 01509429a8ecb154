use crate::{
    components::loading::Loading,
    containers::layout::Layout,
    models::app_state::AppState,
    pages::{
        AdminPage, DashboardPage, ForgotPasswordPage, LoginPage, NotFoundPage, RegisterPage,
        UnavailablePage,
    },
};
use shared::{
    guard::{Access, Decision, decide},
    navigation::{CALENDAR_PARAM, DIRECTORY_PARAM, PrimaryView, SETTINGS_PARAM, UID_PARAM},
};
use strum::EnumIter;
use tracing::{debug, warn};
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::use_selector;

/// The main routes
#[derive(Debug, Clone, PartialEq, Eq, Routable, EnumIter)]
pub enum MainRoute {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/forgot-password")]
    ForgotPassword,
    #[at("/profile/:uid")]
    Profile { uid: String },
    #[at("/admin")]
    Admin,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl MainRoute {
    /// Access level checked by the guard before the route renders.
    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Self::Login | Self::Register | Self::ForgotPassword | Self::NotFound => Access::Public,
            Self::Home | Self::Profile { .. } => Access::Protected,
            Self::Admin => Access::AdminOnly,
        }
    }
}

/// Query pair that selects `view` on the dashboard route.
#[must_use]
pub fn view_query(view: &PrimaryView) -> Option<(&'static str, String)> {
    match view {
        PrimaryView::Dashboard => None,
        PrimaryView::Settings => Some((SETTINGS_PARAM, "true".to_string())),
        PrimaryView::Directory => Some((DIRECTORY_PARAM, "true".to_string())),
        PrimaryView::Calendar => Some((CALENDAR_PARAM, "true".to_string())),
        PrimaryView::Profile(uid) => Some((UID_PARAM, uid.clone())),
    }
}

/// Navigate to the dashboard location showing `view`.
pub fn push_view(navigator: &Navigator, view: &PrimaryView) {
    match view_query(view) {
        None => navigator.push(&MainRoute::Home),
        Some(pair) => {
            if let Err(err) = navigator.push_with_query(&MainRoute::Home, &[pair]) {
                warn!(view = %view, error = %err, "navigation failed");
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct GuardedRouteProps {
    pub route: MainRoute,
}

/// Renders a route only when the guard allows it.
#[function_component(GuardedRoute)]
fn guarded_route(props: &GuardedRouteProps) -> Html {
    let guard = use_selector(|state: &AppState| state.guard.clone());

    match decide(&guard, props.route.access()) {
        Decision::Render => render(&props.route),
        Decision::Loading => html! { <Loading /> },
        Decision::RedirectLogin => html! { <Redirect<MainRoute> to={MainRoute::Login} /> },
        Decision::RedirectHome => html! { <Redirect<MainRoute> to={MainRoute::Home} /> },
        Decision::Unavailable(failure) => html! {
            <UnavailablePage message={AttrValue::from(failure.user_message())} />
        },
    }
}

fn render(route: &MainRoute) -> Html {
    match route {
        MainRoute::Login => html! { <LoginPage /> },
        MainRoute::Register => html! { <RegisterPage /> },
        MainRoute::ForgotPassword => html! { <ForgotPasswordPage /> },
        MainRoute::Home | MainRoute::Profile { .. } => html! {
            <Layout>
                <DashboardPage />
            </Layout>
        },
        MainRoute::Admin => html! {
            <Layout title={AttrValue::from("Admin")}>
                <AdminPage />
            </Layout>
        },
        MainRoute::NotFound => html! { <NotFoundPage /> },
    }
}

/// Switch function for the main routes.
pub fn switch(route: MainRoute) -> Html {
    debug!(?route, "switching route");
    html! { <GuardedRoute {route} /> }
}
