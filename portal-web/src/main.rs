mod api;
mod app;
mod components;
mod config;
mod containers;
mod context;
mod language;
mod logging;
mod models;
mod pages;
mod routes;
mod storage;


use app::App;
use context::Portal;
use i18nrs::yew::I18nProvider;
use i18nrs::yew::I18nProviderConfig;
use language::supported_languages;
use shared::config::PortalConfig;
use std::collections::HashMap;
use tracing::{error, info, warn};
use yew::{ContextProvider, Html, Properties, Renderer, function_component, html};
use yewdux::YewduxRoot;

#[derive(Properties, PartialEq)]
struct RootProps {
    portal: Portal,
}

#[function_component(InternationalApp)]
fn international_app(props: &RootProps) -> Html {
    let translations: HashMap<&str, &str> = supported_languages()
        .iter()
        .map(|(&key, value)| (key, value.translation))
        .collect();

    let config = I18nProviderConfig {
        translations,
        default_language: "en".to_string(),
        ..Default::default()
    };

    html! {
        <YewduxRoot>
            <I18nProvider ..config>
                <ContextProvider<Portal> context={props.portal.clone()}>
                    <App />
                </ContextProvider<Portal>>
            </I18nProvider>
        </YewduxRoot>
    }
}

fn install_panic_hook() {
    // Log the whole payload; the default hook truncates it in the console.
    std::panic::set_hook(Box::new(|info| {
        let payload = info
            .payload()
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| info.payload().downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic");
        let location = info.location().map_or_else(String::new, |location| {
            format!(" at {}:{}:{}", location.file(), location.line(), location.column())
        });
        web_sys::console::error_1(&format!("Panic: {payload}{location}").into());
    }));
}

fn main() {
    install_panic_hook();

    let (config, load_error) = match config::load() {
        Ok(config) => (config, None),
        Err(err) => (PortalConfig::with_defaults(), Some(err)),
    };
    logging::init(&config.log_level);
    if let Some(err) = load_error {
        error!(error = %err, "configuration rejected, using defaults");
    }
    if let Err(problems) = config.validate() {
        for problem in &problems {
            warn!(%problem, "configuration problem");
        }
    }

    info!(project = %config.project_id, "starting employee portal");
    let portal = Portal::connect(config);

    let Some(body) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
    else {
        error!("no document body to mount into");
        return;
    };
    Renderer::<InternationalApp>::with_root_and_props(body.into(), RootProps { portal }).render();
}
