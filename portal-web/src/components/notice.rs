use crate::context::use_portal;
use gloo_timers::future::TimeoutFuture;
use shared::session::Liveness;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Error => "alert-error",
            Self::Info => "alert-info",
        }
    }
}

/// A message shown in place, next to the form or list it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: AttrValue,
}

impl Notice {
    pub fn success(message: impl Into<AttrValue>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<AttrValue>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<AttrValue>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct InlineNoticeProps {
    pub notice: Option<Notice>,
    /// When set, success notices dismiss themselves after the configured
    /// delay. Errors stay until the next action.
    #[prop_or_default]
    pub on_dismiss: Option<Callback<()>>,
}

#[function_component(InlineNotice)]
pub fn inline_notice(props: &InlineNoticeProps) -> Html {
    let portal = use_portal();

    {
        let on_dismiss = props.on_dismiss.clone();
        let delay = portal.config.notice_dismiss_ms;
        use_effect_with(props.notice.clone(), move |notice| {
            let alive = Liveness::new();
            if let (Some(notice), Some(on_dismiss)) = (notice, on_dismiss)
                && notice.kind == NoticeKind::Success
            {
                let alive = alive.clone();
                spawn_local(async move {
                    TimeoutFuture::new(u32::try_from(delay).unwrap_or(u32::MAX)).await;
                    if alive.is_alive() {
                        on_dismiss.emit(());
                    }
                });
            }
            move || alive.end()
        });
    }

    let Some(notice) = &props.notice else {
        return html! {};
    };

    html! {
        <div role="alert" class={classes!("alert", notice.kind.class())}>
            <span>{notice.message.clone()}</span>
            if let Some(on_dismiss) = props.on_dismiss.clone() {
                <button
                    class="btn btn-ghost btn-xs"
                    aria-label="Dismiss"
                    onclick={Callback::from(move |_: MouseEvent| on_dismiss.emit(()))}
                >
                    {"✕"}
                </button>
            }
        </div>
    }
}
