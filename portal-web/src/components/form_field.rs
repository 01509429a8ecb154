use shared::{ValidationErrors, validation::FieldName};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FormFieldProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub value: AttrValue,
    pub on_change: Callback<String>,
    #[prop_or(AttrValue::from("text"))]
    pub input_type: AttrValue,
    #[prop_or_default]
    pub placeholder: Option<AttrValue>,
    #[prop_or_default]
    pub error: Option<AttrValue>,
    #[prop_or_default]
    pub disabled: bool,
}

/// Labelled input with its validation message underneath.
#[function_component(FormField)]
pub fn form_field(props: &FormFieldProps) -> Html {
    let oninput = {
        let on_change = props.on_change.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                on_change.emit(input.value());
            }
        })
    };
    let input_class = classes!(
        "input",
        "input-bordered",
        "w-full",
        props.error.is_some().then_some("input-error")
    );

    html! {
        <div class="form-control">
            <label class="label" for={props.id.clone()}>
                <span class="label-text">{props.label.clone()}</span>
            </label>
            <input
                id={props.id.clone()}
                class={input_class}
                type={props.input_type.clone()}
                placeholder={props.placeholder.clone()}
                value={props.value.clone()}
                disabled={props.disabled}
                {oninput}
            />
            if let Some(error) = &props.error {
                <label class="label">
                    <span class="label-text-alt text-error">{error.clone()}</span>
                </label>
            }
        </div>
    }
}

/// Message for `field`, if the last validation flagged it.
pub fn field_error(errors: Option<&ValidationErrors>, field: FieldName) -> Option<AttrValue> {
    errors
        .and_then(|errors| errors.for_field(field))
        .map(|error| AttrValue::from(error.message()))
}

/// Callback writing one field of a form held in state.
pub fn update_field<T>(form: &UseStateHandle<T>, apply: fn(&mut T, String)) -> Callback<String>
where
    T: Clone + 'static,
{
    let form = form.clone();
    Callback::from(move |value: String| {
        let mut next = (*form).clone();
        apply(&mut next, value);
        form.set(next);
    })
}
