use crate::{
    components::{InlineNotice, Notice},
    context::{use_liveness, use_portal},
    models::app_state::AppState,
};
use i18nrs::yew::use_translation;
use shared::models::{Profile, Role};
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;
use yewdux::prelude::use_selector;

#[derive(Debug, Default, PartialEq)]
struct Users {
    list: Option<Vec<Profile>>,
}

enum UsersAction {
    Loaded(Vec<Profile>),
    RoleChanged { uid: String, role: Role },
    Removed(String),
}

impl Reducible for Users {
    type Action = UsersAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut list = self.list.clone().unwrap_or_default();
        match action {
            UsersAction::Loaded(loaded) => list = loaded,
            UsersAction::RoleChanged { uid, role } => {
                if let Some(user) = list.iter_mut().find(|user| user.uid == uid) {
                    user.role = role;
                }
            }
            UsersAction::Removed(uid) => list.retain(|user| user.uid != uid),
        }
        Rc::new(Self { list: Some(list) })
    }
}

fn confirmed(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// User management: change roles and remove portal profiles.
#[function_component(AdminPage)]
pub fn admin_page() -> Html {
    let portal = use_portal();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let me = use_selector(|state: &AppState| {
        state
            .guard
            .profile()
            .map(|profile| profile.uid.clone())
            .unwrap_or_default()
    });
    let users = use_reducer(Users::default);
    let notice = use_state(|| None::<Notice>);

    {
        let admin = portal.admin.clone();
        let users = users.dispatcher();
        let notice = notice.clone();
        let alive = alive.clone();
        use_effect_with((), move |()| {
            spawn_local(async move {
                let result = admin.list_users().await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(list) => users.dispatch(UsersAction::Loaded(list)),
                    Err(err) => {
                        users.dispatch(UsersAction::Loaded(Vec::new()));
                        notice.set(Some(Notice::error(err.user_message())));
                    }
                }
            });
        });
    }

    let on_dismiss = {
        let notice = notice.clone();
        Callback::from(move |()| notice.set(None))
    };

    let rows = users.list.iter().flatten().map(|user| {
        let is_me = user.uid == *me;

        let on_role = {
            let admin = portal.admin.clone();
            let users = users.dispatcher();
            let notice = notice.clone();
            let alive = alive.clone();
            let uid = user.uid.clone();
            let stored = user.role;
            let changed = i18n.t("admin.roleChanged");
            Callback::from(move |event: Event| {
                let Some(select) = event.target_dyn_into::<HtmlSelectElement>() else {
                    return;
                };
                let role = match select.value().parse::<Role>() {
                    Ok(role) => role,
                    Err(err) => {
                        warn!(value = %select.value(), error = err, "unknown role selected");
                        return;
                    }
                };
                let admin = admin.clone();
                let users = users.clone();
                let notice = notice.clone();
                let alive = alive.clone();
                let uid = uid.clone();
                let changed = changed.clone();
                spawn_local(async move {
                    let result = admin.set_role(&uid, role).await;
                    if !alive.is_alive() {
                        return;
                    }
                    match result {
                        Ok(()) => {
                            users.dispatch(UsersAction::RoleChanged { uid, role });
                            notice.set(Some(Notice::success(changed)));
                        }
                        Err(err) => {
                            select.set_value(stored.as_str());
                            notice.set(Some(Notice::error(err.user_message())));
                        }
                    }
                });
            })
        };

        let on_remove = {
            let admin = portal.admin.clone();
            let users = users.dispatcher();
            let notice = notice.clone();
            let alive = alive.clone();
            let user = user.clone();
            let question = i18n.t("admin.confirmRemove");
            let removed = i18n.t("admin.removed");
            Callback::from(move |_: MouseEvent| {
                if !confirmed(&question) {
                    return;
                }
                let admin = admin.clone();
                let users = users.clone();
                let notice = notice.clone();
                let alive = alive.clone();
                let user = user.clone();
                let removed = removed.clone();
                spawn_local(async move {
                    let result = admin.remove_user(&user).await;
                    if !alive.is_alive() {
                        return;
                    }
                    match result {
                        Ok(()) => {
                            users.dispatch(UsersAction::Removed(user.uid));
                            notice.set(Some(Notice::success(removed)));
                        }
                        Err(err) => notice.set(Some(Notice::error(err.user_message()))),
                    }
                });
            })
        };

        html! {
            <tr key={user.uid.clone()}>
                <td>
                    {user.display_name().to_string()}
                    if is_me {
                        <span class="badge badge-outline badge-sm ml-2">{i18n.t("admin.you")}</span>
                    }
                </td>
                <td>{user.email.clone()}</td>
                <td>
                    <select
                        class="select select-bordered select-sm"
                        onchange={on_role}
                        disabled={is_me}
                    >
                        { for Role::all().map(|role| html! {
                            <option value={role.as_str()} selected={role == user.role}>
                                {role.as_str()}
                            </option>
                        }) }
                    </select>
                </td>
                <td>
                    <button
                        class="btn btn-ghost btn-xs text-error"
                        onclick={on_remove}
                        disabled={is_me}
                    >
                        {i18n.t("admin.remove")}
                    </button>
                </td>
            </tr>
        }
    });

    html! {
        <div class="space-y-4">
            <h1 class="text-2xl font-bold">{i18n.t("admin.title")}</h1>
            <InlineNotice notice={(*notice).clone()} {on_dismiss} />
            if users.list.is_none() {
                <span class="loading loading-dots loading-md"></span>
            } else {
                <div class="overflow-x-auto">
                    <table class="table">
                        <thead>
                            <tr>
                                <th>{i18n.t("admin.name")}</th>
                                <th>{i18n.t("admin.email")}</th>
                                <th>{i18n.t("admin.role")}</th>
                                <th>{i18n.t("admin.actions")}</th>
                            </tr>
                        </thead>
                        <tbody>{ for rows }</tbody>
                    </table>
                </div>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(uid: &str, role: Role) -> Profile {
        Profile {
            uid: uid.to_string(),
            name: uid.to_uppercase(),
            email: format!("{uid}@example.com"),
            role,
            wire_sign: "AB".to_string(),
            contact: "09171234567".to_string(),
            photo_url: None,
        }
    }

    fn loaded() -> Rc<Users> {
        Rc::new(Users::default()).reduce(UsersAction::Loaded(vec![
            user("ana", Role::Admin),
            user("ben", Role::User),
        ]))
    }

    #[test]
    fn role_change_updates_only_that_user() {
        let users = loaded().reduce(UsersAction::RoleChanged {
            uid: "ben".to_string(),
            role: Role::Employee,
        });
        let roles: Vec<Role> = users.list.iter().flatten().map(|user| user.role).collect();
        assert_eq!(roles, [Role::Admin, Role::Employee]);
    }

    #[test]
    fn removal_drops_the_row() {
        let users = loaded().reduce(UsersAction::Removed("ana".to_string()));
        let uids: Vec<&str> = users
            .list
            .iter()
            .flatten()
            .map(|user| user.uid.as_str())
            .collect();
        assert_eq!(uids, ["ben"]);
    }
}
