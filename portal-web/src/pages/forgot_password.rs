use crate::{
    components::{FormField, InlineNotice, Notice, field_error, update_field},
    context::{use_liveness, use_portal},
    routes::MainRoute,
};
use i18nrs::yew::use_translation;
use shared::{
    PortalError, ValidationErrors,
    validation::{FieldName, PasswordResetForm},
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component(ForgotPasswordPage)]
pub fn forgot_password_page() -> Html {
    let portal = use_portal();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let form = use_state(PasswordResetForm::default);
    let errors = use_state(|| None::<ValidationErrors>);
    let notice = use_state(|| None::<Notice>);
    let loading = use_state(|| false);

    let onsubmit = {
        let accounts = portal.accounts.clone();
        let form = form.clone();
        let errors = errors.clone();
        let notice = notice.clone();
        let loading = loading.clone();
        let done = i18n.t("forgot.done");
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            notice.set(None);
            loading.set(true);

            let accounts = accounts.clone();
            let submitted = (*form).clone();
            let errors = errors.clone();
            let notice = notice.clone();
            let loading = loading.clone();
            let alive = alive.clone();
            let done = done.clone();
            spawn_local(async move {
                let result = accounts.request_password_reset(&submitted).await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(()) => {
                        errors.set(None);
                        notice.set(Some(Notice::success(done)));
                    }
                    Err(PortalError::Validation(invalid)) => errors.set(Some(invalid)),
                    Err(err) => {
                        errors.set(None);
                        notice.set(Some(Notice::error(err.user_message())));
                    }
                }
                loading.set(false);
            });
        })
    };

    let on_email = update_field(&form, |form, email| form.email = email);
    let is_busy = *loading;

    html! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-lg bg-base-100">
                <form class="card-body" {onsubmit} novalidate=true>
                    <h2 class="card-title text-2xl">{i18n.t("forgot.title")}</h2>
                    <InlineNotice notice={(*notice).clone()} />
                    <FormField
                        id="email"
                        label={i18n.t("forgot.email")}
                        input_type="email"
                        value={form.email.clone()}
                        on_change={on_email}
                        error={field_error((*errors).as_ref(), FieldName::Email)}
                        disabled={is_busy}
                    />
                    <div class="form-control mt-6">
                        <button class="btn btn-primary" type="submit" disabled={is_busy}>
                            {i18n.t("forgot.submit")}
                        </button>
                    </div>
                    <Link<MainRoute> to={MainRoute::Login} classes="link text-sm mt-2">
                        {i18n.t("forgot.back")}
                    </Link<MainRoute>>
                </form>
            </div>
        </div>
    }
}
