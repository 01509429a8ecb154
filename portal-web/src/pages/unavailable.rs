use i18nrs::yew::use_translation;
use tracing::warn;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UnavailablePageProps {
    pub message: AttrValue,
}

/// Shown when the session state could not be determined. The only way out
/// is a full reload.
#[function_component(UnavailablePage)]
pub fn unavailable_page(props: &UnavailablePageProps) -> Html {
    let (i18n, ..) = use_translation();

    let reload = Callback::from(|_: MouseEvent| {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().reload() {
            warn!(error = ?err, "reload failed");
        }
    });

    html! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-md">
                    <h1 class="text-3xl font-bold">{i18n.t("unavailable.title")}</h1>
                    <p class="py-6">{props.message.clone()}</p>
                    <button class="btn btn-primary" onclick={reload}>
                        {i18n.t("unavailable.reload")}
                    </button>
                </div>
            </div>
        </div>
    }
}
