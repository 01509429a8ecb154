use crate::{
    components::{loading::Loading, theme_switcher},
    context::use_portal,
    models::app_state::AppState,
    routes::{MainRoute, switch},
};
use gloo_timers::future::TimeoutFuture;
use shared::{guard::GuardState, models::Theme, navigation::PageShowAction, session::Liveness};
use tracing::{info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::PageTransitionEvent;
use yew::suspense::Suspense;
use yew::{Html, function_component, html, use_effect_with};
use yew_hooks::use_event_with_window;
use yew_router::prelude::*;
use yewdux::prelude::use_store;

/// Mounts the session store for the lifetime of the page and mirrors its
/// guard state into [`AppState`].
#[function_component(App)]
pub fn app() -> Html {
    let portal = use_portal();
    let (_, dispatch) = use_store::<AppState>();

    {
        let portal = portal.clone();
        use_effect_with((), move |()| {
            let store = portal.store.clone();

            let saved = store.preferences().theme();
            let theme = Theme::resolve(saved, theme_switcher::system_prefers_dark());
            theme_switcher::apply_theme(theme);

            let changes = {
                let source = store.clone();
                let dispatch = dispatch.clone();
                store.subscribe(move |guard: &GuardState| {
                    let guard = guard.clone();
                    let preferences = source.preferences().load();
                    dispatch.reduce_mut(move |state| {
                        state.guard = guard;
                        state.preferences = preferences;
                    });
                })
            };

            let events = store.mount();
            {
                let guard = store.guard_state();
                let preferences = store.preferences().load();
                dispatch.reduce_mut(move |state| {
                    state.guard = guard;
                    state.preferences = preferences;
                    state.theme = Some(theme);
                });
            }
            {
                let store = store.clone();
                spawn_local(async move { store.drive(events).await });
            }

            let alive = Liveness::new();
            {
                let store = store.clone();
                let alive = alive.clone();
                let millis = portal.config.session_check_timeout_ms;
                spawn_local(async move {
                    TimeoutFuture::new(u32::try_from(millis).unwrap_or(u32::MAX)).await;
                    if alive.is_alive() {
                        store.check_timed_out(millis);
                    }
                });
            }

            move || {
                alive.end();
                changes.unsubscribe();
                store.unmount();
            }
        });
    }

    use_event_with_window("pageshow", |event: PageTransitionEvent| {
        if PageShowAction::for_event(event.persisted()) != PageShowAction::Reload {
            return;
        }
        info!("page restored from the back/forward cache, reloading");
        if let Some(window) = web_sys::window()
            && let Err(err) = window.location().reload()
        {
            warn!(error = ?err, "reload failed");
        }
    });

    html! {
        <Suspense fallback={ html!{ <Loading /> } }>
            <BrowserRouter>
                <Switch<MainRoute> render={switch} />
            </BrowserRouter>
        </Suspense>
    }
}
