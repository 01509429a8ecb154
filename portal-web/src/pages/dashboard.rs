use crate::{
    components::{InlineNotice, Notice, loading::Loading, sidebar::link_icon},
    context::{use_liveness, use_portal},
    models::app_state::AppState,
    pages::{CalendarView, DirectoryView, ProfilePage, SettingsView},
    routes::push_view,
};
use i18nrs::yew::use_translation;
use shared::{
    activity::RECENT_ACTIVITY_LIMIT,
    models::ActivityEntry,
    navigation::{NavLink, NavigationState, PrimaryView},
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_icons::{Icon, IconId};
use yew_router::hooks::{use_location, use_navigator};
use yewdux::prelude::use_selector;

/// Host for every dashboard view; the location picks exactly one.
#[function_component(DashboardPage)]
pub fn dashboard_page() -> Html {
    let location = use_location();
    let guard = use_selector(|state: &AppState| state.guard.clone());
    let Some(profile) = guard.profile().cloned() else {
        return html! { <Loading /> };
    };
    let view = location
        .as_ref()
        .map_or(PrimaryView::Dashboard, |location| {
            NavigationState::new(location.path(), location.query_str()).view()
        });

    match view {
        PrimaryView::Dashboard => html! { <Overview name={profile.display_name().to_string()} /> },
        PrimaryView::Settings => html! { <SettingsView {profile} /> },
        PrimaryView::Directory => html! { <DirectoryView /> },
        PrimaryView::Calendar => html! { <CalendarView user_id={profile.uid.clone()} /> },
        PrimaryView::Profile(uid) => html! { <ProfilePage {uid} /> },
    }
}

#[derive(Properties, PartialEq)]
struct OverviewProps {
    name: AttrValue,
}

#[function_component(Overview)]
fn overview(props: &OverviewProps) -> Html {
    let portal = use_portal();
    let navigator = use_navigator();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let entries = use_state(|| None::<Vec<ActivityEntry>>);
    let notice = use_state(|| None::<Notice>);

    {
        let activity = portal.activity.clone();
        let entries = entries.clone();
        let notice = notice.clone();
        use_effect_with((), move |()| {
            spawn_local(async move {
                let result = activity.recent(RECENT_ACTIVITY_LIMIT).await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(recent) => entries.set(Some(recent)),
                    Err(err) => {
                        entries.set(Some(Vec::new()));
                        notice.set(Some(Notice::error(err.user_message())));
                    }
                }
            });
        });
    }

    let cards = NavLink::all()
        .filter(|link| *link != NavLink::Dashboard)
        .map(|link| {
            let view = link.view();
            let onclick = {
                let navigator = navigator.clone();
                let view = view.clone();
                Callback::from(move |_: MouseEvent| {
                    if let Some(navigator) = &navigator {
                        push_view(navigator, &view);
                    }
                })
            };
            let label = i18n.t(&format!("nav.{}", link.label().to_lowercase()));
            html! {
                <button class="card bg-base-200 shadow hover:shadow-lg text-left" {onclick}>
                    <div class="card-body">
                        <h2 class="card-title">
                            <Icon icon_id={link_icon(link)} class="w-6 h-6" />
                            {label}
                        </h2>
                    </div>
                </button>
            }
        });

    let activity = match &*entries {
        None => html! { <span class="loading loading-dots loading-md"></span> },
        Some(list) if list.is_empty() => html! {
            <p class="text-base-content/70">{i18n.t("dashboard.noActivity")}</p>
        },
        Some(list) => html! {
            <ul class="divide-y divide-base-300">
                { for list.iter().map(|entry| html! {
                    <li key={entry.id.clone()} class="py-2 flex justify-between gap-4">
                        <span>{entry.description_or_placeholder()}</span>
                        <span class="text-xs text-base-content/60 whitespace-nowrap">
                            {entry.formatted_timestamp()}
                        </span>
                    </li>
                }) }
            </ul>
        },
    };

    html! {
        <div class="space-y-6">
            <h1 class="text-2xl font-bold">
                {format!("{}, {}", i18n.t("dashboard.welcome"), props.name)}
            </h1>
            <div class="grid grid-cols-1 md:grid-cols-3 gap-6">
                { for cards }
            </div>
            <div class="card bg-base-200 shadow">
                <div class="card-body">
                    <h2 class="card-title">
                        <Icon icon_id={IconId::HeroiconsOutlineClock} class="w-6 h-6" />
                        {i18n.t("dashboard.activity")}
                    </h2>
                    <InlineNotice notice={(*notice).clone()} />
                    {activity}
                </div>
            </div>
        </div>
    }
}
