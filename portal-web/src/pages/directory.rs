use crate::{
    components::{InlineNotice, Notice},
    context::{use_liveness, use_portal},
    models::app_state::AppState,
    routes::push_view,
};
use i18nrs::yew::use_translation;
use shared::{
    directory::{DirectoryEntry, filter_and_sort},
    models::{SortKey, UiPreferences},
    navigation::PrimaryView,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::hooks::use_navigator;
use yewdux::prelude::use_store;

fn cell(entry: &DirectoryEntry, key: SortKey) -> &str {
    match key {
        SortKey::Name => &entry.name,
        SortKey::WireSign => &entry.wire_sign,
        SortKey::Email => &entry.email,
        SortKey::Contact => &entry.contact,
    }
}

/// Searchable, sortable employee table. Search and sort survive reloads
/// through the preference store.
#[function_component(DirectoryView)]
pub fn directory_view() -> Html {
    let portal = use_portal();
    let navigator = use_navigator();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let (state, dispatch) = use_store::<AppState>();
    let entries = use_state(|| None::<Vec<DirectoryEntry>>);
    let notice = use_state(|| None::<Notice>);

    {
        let directory = portal.directory.clone();
        let entries = entries.clone();
        let notice = notice.clone();
        use_effect_with((), move |()| {
            spawn_local(async move {
                let result = directory.list().await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(list) => entries.set(Some(list)),
                    Err(err) => {
                        entries.set(Some(Vec::new()));
                        notice.set(Some(Notice::error(err.user_message())));
                    }
                }
            });
        });
    }

    let update_preferences = {
        let store = portal.store.clone();
        let state = state.clone();
        move |change: Box<dyn FnOnce(&mut UiPreferences)>| {
            let mut preferences = state.preferences.clone();
            change(&mut preferences);
            store.preferences().save(&preferences);
            dispatch.reduce_mut(move |state| state.preferences = preferences);
        }
    };

    let oninput = {
        let update_preferences = update_preferences.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                let term = input.value();
                update_preferences(Box::new(move |preferences| {
                    preferences.directory_search_term = term;
                }));
            }
        })
    };

    let preferences = &state.preferences;
    let headers = SortKey::all().map(|key| {
        let onclick = {
            let update_preferences = update_preferences.clone();
            Callback::from(move |_: MouseEvent| {
                update_preferences(Box::new(move |preferences| preferences.toggle_sort(key)));
            })
        };
        let active = preferences.directory_sort_key == key;
        html! {
            <th>
                <button class="btn btn-ghost btn-xs" {onclick}>
                    {key.label()}
                    if active {
                        <span class="ml-1">{preferences.directory_sort_order.indicator()}</span>
                    }
                </button>
            </th>
        }
    });

    let body = match &*entries {
        None => html! {
            <tr><td colspan="4"><span class="loading loading-dots loading-md"></span></td></tr>
        },
        Some(list) => {
            let visible = filter_and_sort(list, preferences);
            if visible.is_empty() {
                html! {
                    <tr>
                        <td colspan="4" class="text-base-content/70">
                            {i18n.t("directory.empty")}
                        </td>
                    </tr>
                }
            } else {
                html! {
                    { for visible.into_iter().map(|entry| {
                        let onclick = {
                            let navigator = navigator.clone();
                            let view = PrimaryView::Profile(entry.uid.clone());
                            Callback::from(move |_: MouseEvent| {
                                if let Some(navigator) = &navigator {
                                    push_view(navigator, &view);
                                }
                            })
                        };
                        html! {
                            <tr key={entry.uid.clone()} class="hover cursor-pointer" {onclick}>
                                { for SortKey::all().map(|key| {
                                    html! { <td>{cell(&entry, key).to_string()}</td> }
                                }) }
                            </tr>
                        }
                    }) }
                }
            }
        }
    };

    html! {
        <div class="space-y-4">
            <input
                type="search"
                class="input input-bordered w-full max-w-md"
                placeholder={i18n.t("directory.search")}
                value={preferences.directory_search_term.clone()}
                {oninput}
            />
            <InlineNotice notice={(*notice).clone()} />
            <div class="overflow-x-auto">
                <table class="table table-zebra">
                    <thead>
                        <tr>{ for headers }</tr>
                    </thead>
                    <tbody>{body}</tbody>
                </table>
            </div>
        </div>
    }
}
