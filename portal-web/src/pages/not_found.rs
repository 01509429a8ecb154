use crate::routes::MainRoute;
use i18nrs::yew::use_translation;
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    let (i18n, ..) = use_translation();

    html! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-md">
                    <h1 class="text-5xl font-bold">{"404"}</h1>
                    <p class="py-6">{i18n.t("notFound.title")}</p>
                    <Link<MainRoute> to={MainRoute::Home} classes="btn btn-primary">
                        {i18n.t("notFound.back")}
                    </Link<MainRoute>>
                </div>
            </div>
        </div>
    }
}
