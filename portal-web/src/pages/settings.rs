use crate::{
    components::{FormField, InlineNotice, Notice, field_error, update_field},
    context::{use_liveness, use_portal},
};
use i18nrs::yew::use_translation;
use shared::{
    PortalError, ValidationErrors,
    models::Profile,
    validation::{FieldName, SettingsForm},
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SettingsViewProps {
    pub profile: Profile,
}

fn form_for(profile: &Profile) -> SettingsForm {
    SettingsForm {
        name: profile.name.clone(),
        wire_sign: profile.wire_sign.clone(),
        contact: profile.contact.clone(),
        photo_url: profile.photo_url.clone().unwrap_or_default(),
    }
}

/// Edit the signed-in user's own profile. Email and role are read-only.
#[function_component(SettingsView)]
pub fn settings_view(props: &SettingsViewProps) -> Html {
    let portal = use_portal();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let form = use_state(|| form_for(&props.profile));
    let errors = use_state(|| None::<ValidationErrors>);
    let notice = use_state(|| None::<Notice>);
    let saving = use_state(|| false);

    let onsubmit = {
        let accounts = portal.accounts.clone();
        let form = form.clone();
        let errors = errors.clone();
        let notice = notice.clone();
        let saving = saving.clone();
        let saved = i18n.t("settings.saved");
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            notice.set(None);
            saving.set(true);

            let accounts = accounts.clone();
            let submitted = (*form).clone();
            let form = form.clone();
            let errors = errors.clone();
            let notice = notice.clone();
            let saving = saving.clone();
            let alive = alive.clone();
            let saved = saved.clone();
            spawn_local(async move {
                let result = accounts.save_settings(&submitted).await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(profile) => {
                        form.set(form_for(&profile));
                        errors.set(None);
                        notice.set(Some(Notice::success(saved)));
                    }
                    Err(PortalError::Validation(invalid)) => errors.set(Some(invalid)),
                    Err(err) => {
                        errors.set(None);
                        notice.set(Some(Notice::error(err.user_message())));
                    }
                }
                saving.set(false);
            });
        })
    };

    let on_dismiss = {
        let notice = notice.clone();
        Callback::from(move |()| notice.set(None))
    };
    let is_busy = *saving;
    let invalid = (*errors).as_ref();

    html! {
        <div class="card bg-base-200 shadow max-w-2xl">
            <form class="card-body" {onsubmit} novalidate=true>
                <h2 class="card-title">{i18n.t("settings.title")}</h2>
                <p class="text-sm text-base-content/70">
                    {props.profile.email.clone()}
                    <span class="badge badge-ghost badge-sm ml-2">
                        {props.profile.role.as_str()}
                    </span>
                </p>
                <InlineNotice notice={(*notice).clone()} {on_dismiss} />
                <FormField
                    id="name"
                    label={i18n.t("settings.name")}
                    value={form.name.clone()}
                    on_change={update_field(&form, |form, value| form.name = value)}
                    error={field_error(invalid, FieldName::Name)}
                    disabled={is_busy}
                />
                <FormField
                    id="wireSign"
                    label={i18n.t("settings.wireSign")}
                    value={form.wire_sign.clone()}
                    on_change={update_field(&form, |form, value| form.wire_sign = value)}
                    error={field_error(invalid, FieldName::WireSign)}
                    disabled={is_busy}
                />
                <FormField
                    id="contact"
                    label={i18n.t("settings.contact")}
                    input_type="tel"
                    value={form.contact.clone()}
                    on_change={update_field(&form, |form, value| form.contact = value)}
                    error={field_error(invalid, FieldName::Contact)}
                    disabled={is_busy}
                />
                <FormField
                    id="photoUrl"
                    label={i18n.t("settings.photoUrl")}
                    input_type="url"
                    value={form.photo_url.clone()}
                    on_change={update_field(&form, |form, value| form.photo_url = value)}
                    disabled={is_busy}
                />
                <div class="card-actions justify-end mt-4">
                    <button class="btn btn-primary" type="submit" disabled={is_busy}>
                        {i18n.t("settings.save")}
                    </button>
                </div>
            </form>
        </div>
    }
}
