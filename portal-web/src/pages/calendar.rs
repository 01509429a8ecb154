use crate::{
    components::{FormField, InlineNotice, Notice, field_error, update_field},
    context::{use_liveness, use_portal},
};
use chrono::NaiveDate;
use i18nrs::yew::use_translation;
use shared::{
    PortalError, ValidationErrors,
    calendar::{events_on, group_by_date},
    models::{CalendarEvent, EventDraft},
    validation::FieldName,
};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today in the browser's time zone.
fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    i32::try_from(now.get_full_year())
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, now.get_month() + 1, now.get_date()))
        .unwrap_or_default()
}

/// The signed-in user's notes; `None` until the first load finished.
#[derive(Debug, Default, PartialEq)]
struct Notes {
    events: Option<Vec<CalendarEvent>>,
}

enum NotesAction {
    Loaded(Vec<CalendarEvent>),
    Saved(CalendarEvent),
    Deleted(String),
}

impl Reducible for Notes {
    type Action = NotesAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut events = self.events.clone().unwrap_or_default();
        match action {
            NotesAction::Loaded(loaded) => events = loaded,
            NotesAction::Saved(saved) => {
                match events.iter_mut().find(|event| event.id == saved.id) {
                    Some(slot) => *slot = saved,
                    None => events.push(saved),
                }
            }
            NotesAction::Deleted(id) => events.retain(|event| event.id != id),
        }
        Rc::new(Self {
            events: Some(events),
        })
    }
}

#[derive(Properties, PartialEq)]
pub struct CalendarViewProps {
    pub user_id: AttrValue,
}

#[function_component(CalendarView)]
pub fn calendar_view(props: &CalendarViewProps) -> Html {
    let portal = use_portal();
    let alive = use_liveness();
    let (i18n, ..) = use_translation();
    let notes = use_reducer(Notes::default);
    let date = use_state(today);
    let draft = use_state(EventDraft::default);
    let editing = use_state(|| None::<String>);
    let errors = use_state(|| None::<ValidationErrors>);
    let notice = use_state(|| None::<Notice>);

    {
        let calendar = portal.calendar.clone();
        let notes = notes.dispatcher();
        let notice = notice.clone();
        let alive = alive.clone();
        use_effect_with(props.user_id.clone(), move |user_id| {
            let user_id = user_id.clone();
            spawn_local(async move {
                let result = calendar.list(&user_id).await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(events) => notes.dispatch(NotesAction::Loaded(events)),
                    Err(err) => {
                        notes.dispatch(NotesAction::Loaded(Vec::new()));
                        notice.set(Some(Notice::error(err.user_message())));
                    }
                }
            });
        });
    }

    let reset_form = {
        let draft = draft.clone();
        let editing = editing.clone();
        let errors = errors.clone();
        move || {
            draft.set(EventDraft::default());
            editing.set(None);
            errors.set(None);
        }
    };

    let onsubmit = {
        let calendar = portal.calendar.clone();
        let user_id = props.user_id.clone();
        let notes = notes.dispatcher();
        let date = date.clone();
        let draft = draft.clone();
        let editing = editing.clone();
        let errors = errors.clone();
        let notice = notice.clone();
        let alive = alive.clone();
        let reset_form = reset_form.clone();
        let saved = i18n.t("calendar.saved");
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let calendar = calendar.clone();
            let user_id = user_id.clone();
            let notes = notes.clone();
            let date = *date;
            let submitted = (*draft).clone();
            let editing_id = (*editing).clone();
            let errors = errors.clone();
            let notice = notice.clone();
            let alive = alive.clone();
            let reset_form = reset_form.clone();
            let saved = saved.clone();
            spawn_local(async move {
                let result = calendar
                    .save(&user_id, date, editing_id.as_deref(), &submitted)
                    .await;
                if !alive.is_alive() {
                    return;
                }
                match result {
                    Ok(event) => {
                        notes.dispatch(NotesAction::Saved(event));
                        reset_form();
                        notice.set(Some(Notice::success(saved)));
                    }
                    Err(PortalError::Validation(invalid)) => errors.set(Some(invalid)),
                    Err(err) => notice.set(Some(Notice::error(err.user_message()))),
                }
            });
        })
    };

    let on_date = {
        let date = date.clone();
        let reset_form = reset_form.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>()
                && let Ok(picked) = NaiveDate::parse_from_str(&input.value(), DATE_FORMAT)
            {
                date.set(picked);
                reset_form();
            }
        })
    };

    let on_description = {
        let draft = draft.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlTextAreaElement>() {
                draft.set(EventDraft {
                    description: input.value(),
                    ..(*draft).clone()
                });
            }
        })
    };

    let on_cancel = {
        let reset_form = reset_form.clone();
        Callback::from(move |_: MouseEvent| reset_form())
    };

    let on_dismiss = {
        let notice = notice.clone();
        Callback::from(move |()| notice.set(None))
    };

    let events = notes.events.as_deref().unwrap_or_default();
    let day_notes = events_on(events, *date).into_iter().map(|event| {
        let on_edit = {
            let draft = draft.clone();
            let editing = editing.clone();
            let event = event.clone();
            Callback::from(move |_: MouseEvent| {
                draft.set(EventDraft::from_event(&event));
                editing.set(Some(event.id.clone()));
            })
        };
        let on_delete = {
            let calendar = portal.calendar.clone();
            let notes = notes.dispatcher();
            let notice = notice.clone();
            let alive = alive.clone();
            let reset_form = reset_form.clone();
            let editing = editing.clone();
            let id = event.id.clone();
            let deleted = i18n.t("calendar.deleted");
            Callback::from(move |_: MouseEvent| {
                let calendar = calendar.clone();
                let notes = notes.clone();
                let notice = notice.clone();
                let alive = alive.clone();
                let reset_form = reset_form.clone();
                let was_editing = editing.as_deref() == Some(id.as_str());
                let id = id.clone();
                let deleted = deleted.clone();
                spawn_local(async move {
                    let result = calendar.delete(&id).await;
                    if !alive.is_alive() {
                        return;
                    }
                    match result {
                        Ok(()) => {
                            notes.dispatch(NotesAction::Deleted(id));
                            if was_editing {
                                reset_form();
                            }
                            notice.set(Some(Notice::success(deleted)));
                        }
                        Err(err) => notice.set(Some(Notice::error(err.user_message()))),
                    }
                });
            })
        };
        html! {
            <li key={event.id.clone()} class="card bg-base-100 shadow-sm">
                <div class="card-body p-4">
                    <h3 class="font-semibold">{event.title.clone()}</h3>
                    if !event.description.is_empty() {
                        <p class="text-sm whitespace-pre-line">{event.description.clone()}</p>
                    }
                    <div class="card-actions justify-end">
                        <button class="btn btn-ghost btn-xs" onclick={on_edit}>
                            {i18n.t("calendar.edit")}
                        </button>
                        <button class="btn btn-ghost btn-xs text-error" onclick={on_delete}>
                            {i18n.t("calendar.delete")}
                        </button>
                    </div>
                </div>
            </li>
        }
    });

    let marked_days = group_by_date(events).into_iter().map(|(day, on_day)| {
        let onclick = {
            let date = date.clone();
            let reset_form = reset_form.clone();
            Callback::from(move |_: MouseEvent| {
                date.set(day);
                reset_form();
            })
        };
        let selected = day == *date;
        html! {
            <li key={day.to_string()}>
                <a class={classes!(selected.then_some("menu-active"))} {onclick}>
                    {day.format(DATE_FORMAT).to_string()}
                    <span class="badge badge-sm">{on_day.len().to_string()}</span>
                </a>
            </li>
        }
    });

    let loaded = notes.events.is_some();
    let empty_day = events_on(events, *date).is_empty();
    let is_editing = editing.is_some();

    html! {
        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
            <div class="lg:col-span-2 space-y-4">
                <InlineNotice notice={(*notice).clone()} {on_dismiss} />
                <div class="form-control max-w-xs">
                    <label class="label" for="date">
                        <span class="label-text">{i18n.t("calendar.date")}</span>
                    </label>
                    <input
                        id="date"
                        type="date"
                        class="input input-bordered"
                        value={date.format(DATE_FORMAT).to_string()}
                        oninput={on_date}
                    />
                </div>
                <form class="card bg-base-200 shadow" {onsubmit} novalidate=true>
                    <div class="card-body">
                        <FormField
                            id="title"
                            label={i18n.t("calendar.title")}
                            value={draft.title.clone()}
                            on_change={update_field(&draft, |draft, title| draft.title = title)}
                            error={field_error((*errors).as_ref(), FieldName::Title)}
                        />
                        <div class="form-control">
                            <label class="label" for="description">
                                <span class="label-text">{i18n.t("calendar.description")}</span>
                            </label>
                            <textarea
                                id="description"
                                class="textarea textarea-bordered"
                                value={draft.description.clone()}
                                oninput={on_description}
                            />
                        </div>
                        <div class="card-actions justify-end">
                            if is_editing {
                                <button class="btn btn-ghost" type="button" onclick={on_cancel}>
                                    {i18n.t("calendar.cancel")}
                                </button>
                            }
                            <button class="btn btn-primary" type="submit">
                                {i18n.t(
                                    if is_editing { "calendar.update" } else { "calendar.add" }
                                )}
                            </button>
                        </div>
                    </div>
                </form>
                if !loaded {
                    <span class="loading loading-dots loading-md"></span>
                } else if empty_day {
                    <p class="text-base-content/70">{i18n.t("calendar.empty")}</p>
                } else {
                    <ul class="space-y-2">{ for day_notes }</ul>
                }
            </div>
            <div class="card bg-base-200 shadow">
                <div class="card-body">
                    <h2 class="card-title text-base">{i18n.t("calendar.upcoming")}</h2>
                    <ul class="menu">{ for marked_days }</ul>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, title: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            user_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            title: title.to_string(),
            description: String::new(),
        }
    }

    fn titles(notes: &Notes) -> Vec<&str> {
        notes
            .events
            .iter()
            .flatten()
            .map(|event| event.title.as_str())
            .collect()
    }

    #[test]
    fn saving_a_known_id_replaces_the_note() {
        let notes = Rc::new(Notes::default())
            .reduce(NotesAction::Loaded(vec![note("a", "Standup"), note("b", "Review")]))
            .reduce(NotesAction::Saved(note("a", "Retro")));
        assert_eq!(titles(&notes), ["Retro", "Review"]);
    }

    #[test]
    fn saving_a_new_id_appends() {
        let notes = Rc::new(Notes::default())
            .reduce(NotesAction::Loaded(vec![note("a", "Standup")]))
            .reduce(NotesAction::Saved(note("c", "Lunch")));
        assert_eq!(titles(&notes), ["Standup", "Lunch"]);
    }

    #[test]
    fn delete_removes_only_that_note() {
        let notes = Rc::new(Notes::default())
            .reduce(NotesAction::Loaded(vec![note("a", "Standup"), note("b", "Review")]))
            .reduce(NotesAction::Deleted("a".to_string()));
        assert_eq!(titles(&notes), ["Review"]);
    }

    #[test]
    fn notes_are_unloaded_until_the_first_list() {
        assert!(Notes::default().events.is_none());
        let notes = Rc::new(Notes::default()).reduce(NotesAction::Loaded(Vec::new()));
        assert_eq!(notes.events.as_deref(), Some(&[][..]));
    }
}
