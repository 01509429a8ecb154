use crate::{
    components::{FormField, InlineNotice, Notice, field_error, update_field},
    context::{use_liveness, use_portal},
    models::app_state::AppState,
    routes::MainRoute,
};
use i18nrs::yew::use_translation;
use shared::{
    ValidationErrors,
    guard::GuardState,
    validation::{FieldName, LoginForm},
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::{Link, use_navigator};
use yewdux::prelude::use_selector;

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let portal = use_portal();
    let navigator = use_navigator();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let guard = use_selector(|state: &AppState| state.guard.clone());
    let form = use_state(LoginForm::default);
    let errors = use_state(|| None::<ValidationErrors>);
    let notice = use_state(|| None::<Notice>);
    let loading = use_state(|| false);

    // Leave once the session is active; surface why access was revoked.
    {
        let store = portal.store.clone();
        let notice = notice.clone();
        use_effect_with((*guard).clone(), move |guard| {
            if guard.is_active() {
                if let Some(navigator) = &navigator {
                    navigator.push(&MainRoute::Home);
                }
            } else if let Some(err) = store.take_access_error() {
                notice.set(Some(Notice::error(err.user_message())));
            }
        });
    }

    let onsubmit = {
        let store = portal.store.clone();
        let form = form.clone();
        let errors = errors.clone();
        let notice = notice.clone();
        let loading = loading.clone();
        let alive = alive.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let credentials = match form.validate() {
                Ok(credentials) => credentials,
                Err(invalid) => {
                    errors.set(Some(invalid));
                    return;
                }
            };
            errors.set(None);
            notice.set(None);
            loading.set(true);

            let store = store.clone();
            let notice = notice.clone();
            let loading = loading.clone();
            let alive = alive.clone();
            spawn_local(async move {
                let result = store.sign_in(&credentials).await;
                if !alive.is_alive() {
                    return;
                }
                if let Err(err) = result {
                    notice.set(Some(Notice::error(err.user_message())));
                }
                loading.set(false);
            });
        })
    };

    let on_resend = {
        let store = portal.store.clone();
        let notice = notice.clone();
        let resent = i18n.t("login.resent");
        Callback::from(move |_: MouseEvent| {
            let store = store.clone();
            let notice = notice.clone();
            let alive = alive.clone();
            let sent = resent.clone();
            spawn_local(async move {
                let result = store.send_verification().await;
                if !alive.is_alive() {
                    return;
                }
                notice.set(Some(match result {
                    Ok(()) => Notice::success(sent),
                    Err(err) => Notice::error(err.user_message()),
                }));
            });
        })
    };

    let on_email = update_field(&form, |form, email| form.email = email);
    let on_password = update_field(&form, |form, password| form.password = password);
    let on_dismiss = {
        let notice = notice.clone();
        Callback::from(move |()| notice.set(None))
    };

    let is_busy = *loading;
    let unverified = matches!(*guard, GuardState::AuthenticatedUnverified);
    let invalid = (*errors).as_ref();

    html! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-lg bg-base-100">
                <form class="card-body" {onsubmit} novalidate=true>
                    <h2 class="card-title text-2xl">{i18n.t("login.title")}</h2>
                    <InlineNotice notice={(*notice).clone()} {on_dismiss} />
                    <FormField
                        id="email"
                        label={i18n.t("login.email")}
                        input_type="email"
                        value={form.email.clone()}
                        on_change={on_email}
                        error={field_error(invalid, FieldName::Email)}
                        disabled={is_busy}
                    />
                    <FormField
                        id="password"
                        label={i18n.t("login.password")}
                        input_type="password"
                        value={form.password.clone()}
                        on_change={on_password}
                        error={field_error(invalid, FieldName::Password)}
                        disabled={is_busy}
                    />
                    <div class="form-control mt-6">
                        <button class="btn btn-primary" type="submit" disabled={is_busy}>
                            {if is_busy { i18n.t("login.busy") } else { i18n.t("login.submit") }}
                        </button>
                    </div>
                    if unverified {
                        <button class="btn btn-link btn-sm" type="button" onclick={on_resend}>
                            {i18n.t("login.resend")}
                        </button>
                    }
                    <div class="flex justify-between text-sm mt-2">
                        <Link<MainRoute> to={MainRoute::ForgotPassword} classes="link">
                            {i18n.t("login.forgot")}
                        </Link<MainRoute>>
                        <Link<MainRoute> to={MainRoute::Register} classes="link">
                            {i18n.t("login.register")}
                        </Link<MainRoute>>
                    </div>
                </form>
            </div>
        </div>
    }
}
