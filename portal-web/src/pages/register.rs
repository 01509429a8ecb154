use crate::{
    components::{FormField, InlineNotice, Notice, field_error, update_field},
    context::{use_liveness, use_portal},
    routes::MainRoute,
};
use i18nrs::yew::use_translation;
use shared::{
    PortalError, ValidationErrors,
    validation::{FieldName, RegistrationForm},
};
use tracing::info;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component(RegisterPage)]
pub fn register_page() -> Html {
    let portal = use_portal();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let form = use_state(RegistrationForm::default);
    let errors = use_state(|| None::<ValidationErrors>);
    let notice = use_state(|| None::<Notice>);
    let loading = use_state(|| false);

    let onsubmit = {
        let accounts = portal.accounts.clone();
        let form = form.clone();
        let errors = errors.clone();
        let notice = notice.clone();
        let loading = loading.clone();
        let done = i18n.t("register.done");
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            notice.set(None);
            loading.set(true);

            let accounts = accounts.clone();
            let submitted = (*form).clone();
            let form = form.clone();
            let errors = errors.clone();
            let notice = notice.clone();
            let loading = loading.clone();
            let alive = alive.clone();
            let done = done.clone();
            spawn_local(async move {
                let result = accounts.register(&submitted).await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(account) => {
                        info!(uid = %account.uid, "registration complete");
                        form.set(RegistrationForm::default());
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

    let is_busy = *loading;
    let invalid = (*errors).as_ref();
    let fields = [
        (
            FieldName::Name,
            "text",
            "register.name",
            form.name.clone(),
            update_field(&form, |form, value| form.name = value),
        ),
        (
            FieldName::Email,
            "email",
            "register.email",
            form.email.clone(),
            update_field(&form, |form, value| form.email = value),
        ),
        (
            FieldName::Contact,
            "tel",
            "register.contact",
            form.contact.clone(),
            update_field(&form, |form, value| form.contact = value),
        ),
        (
            FieldName::WireSign,
            "text",
            "register.wireSign",
            form.wire_sign.clone(),
            update_field(&form, |form, value| form.wire_sign = value),
        ),
        (
            FieldName::Password,
            "password",
            "register.password",
            form.password.clone(),
            update_field(&form, |form, value| form.password = value),
        ),
        (
            FieldName::ConfirmPassword,
            "password",
            "register.confirmPassword",
            form.confirm_password.clone(),
            update_field(&form, |form, value| form.confirm_password = value),
        ),
    ];

    html! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="card w-full max-w-lg shadow-lg bg-base-100">
                <form class="card-body" {onsubmit} novalidate=true>
                    <h2 class="card-title text-2xl">{i18n.t("register.title")}</h2>
                    <InlineNotice notice={(*notice).clone()} />
                    { for fields.into_iter().map(|(field, input_type, label, value, on_change)| {
                        html! {
                            <FormField
                                id={field.as_str()}
                                label={i18n.t(label)}
                                {input_type}
                                {value}
                                {on_change}
                                error={field_error(invalid, field)}
                                disabled={is_busy}
                            />
                        }
                    }) }
                    <div class="form-control mt-6">
                        <button class="btn btn-primary" type="submit" disabled={is_busy}>
                            {i18n.t("register.submit")}
                        </button>
                    </div>
                    <Link<MainRoute> to={MainRoute::Login} classes="link text-sm mt-2">
                        {i18n.t("register.login")}
                    </Link<MainRoute>>
                </form>
            </div>
        </div>
    }
}
