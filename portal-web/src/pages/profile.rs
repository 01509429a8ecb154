use crate::{context::use_portal, routes::push_view};
use i18nrs::yew::use_translation;
use shared::{
    directory::ProfileView, models::Profile, navigation::PrimaryView, session::Liveness,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::hooks::use_navigator;

#[derive(Properties, PartialEq)]
pub struct ProfilePageProps {
    pub uid: AttrValue,
}

/// A lookup ends when the uid changes or the page unmounts; its answer is
/// then dropped.
fn still_wanted(view: ProfileView, lookup: &Liveness) -> Option<ProfileView> {
    lookup.is_alive().then_some(view)
}

/// Read-only view of one employee. Unknown uids fall back to the directory.
#[function_component(ProfilePage)]
pub fn profile_page(props: &ProfilePageProps) -> Html {
    let portal = use_portal();
    let navigator = use_navigator();
    let (i18n, ..) = use_translation();
    let profile = use_state(|| None::<Profile>);

    {
        let directory = portal.directory.clone();
        let profile = profile.clone();
        let navigator = navigator.clone();
        use_effect_with(props.uid.clone(), move |uid| {
            profile.set(None);
            let uid = uid.clone();
            let lookup = Liveness::new();
            {
                let lookup = lookup.clone();
                spawn_local(async move {
                    let view = directory.profile_view(&uid).await;
                    match still_wanted(view, &lookup) {
                        Some(ProfileView::Show(found)) => profile.set(Some(found)),
                        Some(ProfileView::RedirectDirectory) => {
                            if let Some(navigator) = &navigator {
                                push_view(navigator, &PrimaryView::Directory);
                            }
                        }
                        None => {}
                    }
                });
            }
            move || lookup.end()
        });
    }

    let Some(profile) = (*profile).clone() else {
        return html! { <span class="loading loading-dots loading-lg"></span> };
    };

    let back = Callback::from(move |_: MouseEvent| {
        if let Some(navigator) = &navigator {
            push_view(navigator, &PrimaryView::Directory);
        }
    });

    html! {
        <div class="card bg-base-200 shadow max-w-xl">
            <div class="card-body items-center text-center">
                <div class="avatar placeholder">
                    if let Some(photo_url) = profile.photo_url.clone() {
                        <div class="w-24 rounded-full">
                            <img src={photo_url} alt={profile.display_name().to_string()} />
                        </div>
                    } else {
                        <div class="bg-neutral text-neutral-content w-24 rounded-full">
                            <span class="text-3xl">{profile.initial().to_string()}</span>
                        </div>
                    }
                </div>
                <h2 class="card-title text-2xl">{profile.display_name().to_string()}</h2>
                <dl class="grid grid-cols-2 gap-x-6 gap-y-2 text-left">
                    <dt class="font-semibold">{i18n.t("profile.email")}</dt>
                    <dd>{profile.email.clone()}</dd>
                    <dt class="font-semibold">{i18n.t("profile.wireSign")}</dt>
                    <dd>{profile.wire_sign.clone()}</dd>
                    <dt class="font-semibold">{i18n.t("profile.contact")}</dt>
                    <dd>{profile.contact.clone()}</dd>
                    <dt class="font-semibold">{i18n.t("profile.role")}</dt>
                    <dd><span class="badge badge-ghost">{profile.role.as_str()}</span></dd>
                </dl>
                <div class="card-actions mt-4">
                    <button class="btn btn-outline btn-sm" onclick={back}>
                        {i18n.t("profile.back")}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shown(uid: &str) -> ProfileView {
        ProfileView::Show(serde_json::from_value(json!({ "uid": uid, "name": uid })).unwrap())
    }

    #[test]
    fn answer_for_the_current_uid_is_applied() {
        let lookup = Liveness::new();
        assert_eq!(still_wanted(shown("b"), &lookup), Some(shown("b")));
        assert_eq!(
            still_wanted(ProfileView::RedirectDirectory, &lookup),
            Some(ProfileView::RedirectDirectory)
        );
    }

    #[test]
    fn answer_for_a_previous_uid_is_dropped() {
        let first = Liveness::new();
        let second = Liveness::new();
        // The uid changed from "a" to "b" before "a" resolved.
        first.end();
        assert_eq!(still_wanted(shown("a"), &first), None);
        assert_eq!(still_wanted(ProfileView::RedirectDirectory, &first), None);
        assert_eq!(still_wanted(shown("b"), &second), Some(shown("b")));
    }
}
