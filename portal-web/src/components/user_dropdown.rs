use crate::{
    context::use_portal,
    models::app_state::AppState,
    routes::{MainRoute, push_view},
};
use i18nrs::yew::use_translation;
use shared::navigation::PrimaryView;
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::hooks::use_navigator;
use yewdux::prelude::use_selector;

#[function_component(UserDropdown)]
pub fn user_dropdown() -> Html {
    let portal = use_portal();
    let navigator = use_navigator();
    let (i18n, ..) = use_translation();
    let guard = use_selector(|state: &AppState| state.guard.clone());
    let Some(profile) = guard.profile().cloned() else {
        return html! {};
    };

    let profile_button = {
        let navigator = navigator.clone();
        let view = PrimaryView::Profile(profile.uid.clone());
        let onclick = Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            if let Some(navigator) = &navigator {
                push_view(navigator, &view);
            }
        });
        html! {
            <li><a {onclick}>{i18n.t("header.profile")}</a></li>
        }
    };

    let settings_button = {
        let navigator = navigator.clone();
        let onclick = Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            if let Some(navigator) = &navigator {
                push_view(navigator, &PrimaryView::Settings);
            }
        });
        html! {
            <li><a {onclick}>{i18n.t("nav.settings")}</a></li>
        }
    };

    let logout_button = {
        let store = portal.store.clone();
        let onclick = Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            let store = store.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                if let Err(err) = store.logout().await {
                    warn!(error = %err, "provider sign-out failed");
                }
                if let Some(navigator) = navigator {
                    navigator.push(&MainRoute::Login);
                }
            });
        });
        html! {
            <li><a {onclick}>{i18n.t("header.logout")}</a></li>
        }
    };

    html! {
        <div class="dropdown dropdown-end">
            <div tabindex="0" role="button" class="btn btn-ghost btn-circle avatar placeholder">
                if let Some(photo_url) = profile.photo_url.clone() {
                    <div class="w-9 rounded-full">
                        <img src={photo_url} alt={profile.display_name().to_string()} />
                    </div>
                } else {
                    <div class="bg-neutral text-neutral-content w-9 rounded-full">
                        <span>{profile.initial().to_string()}</span>
                    </div>
                }
            </div>
            <ul
                tabIndex={0}
                class="dropdown-content z-[1] menu p-2 shadow bg-base-200 rounded-box w-52"
            >
                <li class="px-2 py-1 text-left">
                    <div class="text-sm font-semibold text-base-content">
                        { profile.display_name().to_string() }
                    </div>
                    <div class="text-xs text-base-content/70">{ profile.email.clone() }</div>
                    <div class="badge badge-ghost badge-sm mt-1">{ profile.role.as_str() }</div>
                </li>
                <div class="divider my-0"></div>
                {profile_button}
                {settings_button}
                <div class="divider my-0"></div>
                {logout_button}
            </ul>
        </div>
    }
}
