use crate::{context::use_portal, models::app_state::AppState};
use i18nrs::yew::use_translation;
use shared::models::Theme;
use web_sys::window;
use yew::{Callback, Classes, Html, Properties, function_component, html};
use yew_icons::{Icon, IconId};
use yewdux::prelude::use_store;

/// Whether the browser asks for a dark colour scheme.
pub fn system_prefers_dark() -> bool {
    window()
        .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .is_some_and(|media_query| media_query.matches())
}

/// Set `data-theme` on the root element.
pub fn apply_theme(theme: Theme) {
    if let Some(window) = window()
        && let Some(document) = window.document()
        && let Some(html_element) = document.document_element()
    {
        let _ = html_element.set_attribute("data-theme", theme.as_str());
    }
}

#[derive(Properties, PartialEq, Eq)]
pub struct ThemeSwitcherProps {
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(ThemeSwitcher)]
pub fn theme_switcher(props: &ThemeSwitcherProps) -> Html {
    let (i18n, ..) = use_translation();
    let portal = use_portal();
    let (state, dispatch) = use_store::<AppState>();
    let current = state
        .theme
        .unwrap_or_else(|| Theme::resolve(None, system_prefers_dark()));

    let toggle_theme = Callback::from(move |_: yew::MouseEvent| {
        let next = current.toggled();
        apply_theme(next);
        portal.store.preferences().set_theme(next);
        dispatch.reduce_mut(|state| state.theme = Some(next));
    });

    // Sun in dark mode (switch to light), moon in light mode
    let theme_icon = match current {
        Theme::Light => IconId::HeroiconsSolidMoon,
        Theme::Dark => IconId::HeroiconsSolidSun,
    };

    html! {
        <div class={props.class.clone()}>
            <button
                class="btn btn-ghost btn-circle"
                onclick={toggle_theme}
                aria-label={i18n.t("theme.selector")}
            >
                <Icon icon_id={theme_icon} class="h-5 w-5" />
            </button>
        </div>
    }
}
