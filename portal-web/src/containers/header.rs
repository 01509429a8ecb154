use crate::components::{theme_switcher::ThemeSwitcher, user_dropdown::UserDropdown};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    /// Breadcrumb of the view being shown.
    pub title: AttrValue,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    html! {
        <nav class="navbar justify-between bg-base-300 px-4">
            <div class="breadcrumbs text-sm">
                <ul>
                    <li>{"Portal"}</li>
                    <li aria-current="page">{props.title.clone()}</li>
                </ul>
            </div>
            <div class="flex items-center gap-2">
                <ThemeSwitcher />
                <UserDropdown />
            </div>
        </nav>
    }
}
