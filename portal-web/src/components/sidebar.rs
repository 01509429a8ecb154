use crate::{
    context::use_portal,
    models::app_state::AppState,
    routes::{MainRoute, push_view},
};
use i18nrs::yew::use_translation;
use shared::navigation::{NavLink, PrimaryView};
use yew::prelude::*;
use yew_icons::{Icon, IconId};
use yew_router::prelude::{Link, use_navigator};
use yewdux::prelude::use_store;

pub(crate) fn link_icon(link: NavLink) -> IconId {
    match link {
        NavLink::Dashboard => IconId::HeroiconsOutlineHome,
        NavLink::Directory => IconId::HeroiconsOutlineUserGroup,
        NavLink::Calendar => IconId::HeroiconsOutlineCalendar,
        NavLink::Settings => IconId::HeroiconsOutlineCog6Tooth,
    }
}

#[derive(Properties, PartialEq)]
pub struct SidebarProps {
    /// `None` outside the dashboard, e.g. on the admin panel.
    #[prop_or_default]
    pub current: Option<PrimaryView>,
}

#[function_component(Sidebar)]
pub fn sidebar(props: &SidebarProps) -> Html {
    let (i18n, ..) = use_translation();
    let portal = use_portal();
    let navigator = use_navigator();
    let (state, dispatch) = use_store::<AppState>();
    let collapsed = state.preferences.sidebar_collapsed;

    let toggle = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| {
            let mut preferences = state.preferences.clone();
            preferences.sidebar_collapsed = !preferences.sidebar_collapsed;
            portal.store.preferences().save(&preferences);
            dispatch.reduce_mut(move |state| state.preferences = preferences);
        })
    };

    let items = NavLink::all().map(|link| {
        let view = link.view();
        let active = props
            .current
            .as_ref()
            .is_some_and(|current| link.is_active(current));
        let onclick = {
            let navigator = navigator.clone();
            let view = view.clone();
            Callback::from(move |event: MouseEvent| {
                event.prevent_default();
                if let Some(navigator) = &navigator {
                    push_view(navigator, &view);
                }
            })
        };
        let label = i18n.t(&format!("nav.{}", link.label().to_lowercase()));

        html! {
            <li>
                <a
                    href={view.href()}
                    class={classes!("gap-3", active.then_some("menu-active"))}
                    aria-current={active.then_some("page")}
                    title={label.clone()}
                    {onclick}
                >
                    <Icon icon_id={link_icon(link)} class="h-5 w-5" />
                    if !collapsed {
                        <span>{label}</span>
                    }
                </a>
            </li>
        }
    });

    html! {
        <aside class={classes!(
            "bg-base-200", "min-h-screen", "flex", "flex-col", "transition-all", "duration-300",
            if collapsed { "w-16" } else { "w-60" }
        )}>
            <div class="flex items-center justify-between p-3">
                if !collapsed {
                    <span class="font-semibold">{i18n.t("app.title")}</span>
                }
                <button
                    class="btn btn-ghost btn-sm btn-square"
                    onclick={toggle}
                    aria-label={i18n.t(
                        if collapsed { "sidebar.expand" } else { "sidebar.collapse" }
                    )}
                >
                    <Icon
                        icon_id={if collapsed {
                            IconId::HeroiconsSolidChevronDoubleRight
                        } else {
                            IconId::HeroiconsSolidChevronDoubleLeft
                        }}
                        class="h-4 w-4"
                    />
                </button>
            </div>
            <ul class="menu w-full gap-1">
                { for items }
                if state.is_admin() {
                    <li>
                        <Link<MainRoute> to={MainRoute::Admin} classes="gap-3">
                            <Icon icon_id={IconId::HeroiconsOutlineShieldCheck} class="h-5 w-5" />
                            if !collapsed {
                                <span>{i18n.t("nav.admin")}</span>
                            }
                        </Link<MainRoute>>
                    </li>
                }
            </ul>
        </aside>
    }
}
