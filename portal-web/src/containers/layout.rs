use crate::{components::sidebar::Sidebar, containers::header::Header};
use shared::navigation::NavigationState;
use yew::{AttrValue, Children, Html, Properties, classes, function_component, html};
use yew_router::hooks::use_location;

#[derive(Properties, PartialEq)]
pub struct LayoutProps {
    pub children: Children,
    /// Overrides the breadcrumb derived from the location.
    #[prop_or_default]
    pub title: Option<AttrValue>,
}

/// Chrome around every signed-in page. The breadcrumb and the highlighted
/// sidebar entry both come from the location's [`PrimaryView`].
///
/// [`PrimaryView`]: shared::navigation::PrimaryView
#[function_component(Layout)]
pub fn layout(props: &LayoutProps) -> Html {
    let location = use_location();
    let view = location
        .as_ref()
        .map(|location| NavigationState::new(location.path(), location.query_str()).view());

    // A title override means the page is not a dashboard view.
    let (title, current) = match (&props.title, view) {
        (Some(title), _) => (title.clone(), None),
        (None, Some(view)) => (AttrValue::from(view.breadcrumb()), Some(view)),
        (None, None) => (AttrValue::from("Dashboard"), None),
    };

    html! {
        <div class="flex min-h-screen bg-base-100">
            <Sidebar {current} />
            <div class="flex flex-col flex-grow">
                <Header {title} />
                <main class={classes!(
                    "flex-grow",
                    "p-4",
                    "transition-all",
                    "duration-300"
                )}>
                    {props.children.clone()}
                </main>
                <footer class="footer footer-center p-4 border-t border-base-300 text-base-content">
                    <p>{"Employee Portal · Built with Rust, Yew and DaisyUI"}</p>
                </footer>
            </div>
        </div>
    }
}
