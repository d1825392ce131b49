//! Placeholder shown while a protected view waits on a guard

use yew::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub struct SpinnerProps {
    /// Announced to screen readers and shown under the spinner
    #[prop_or(AttrValue::Static("Loading..."))]
    pub label: AttrValue,
}

#[function_component(LoadingSpinner)]
pub fn loading_spinner(props: &SpinnerProps) -> Html {
    html! {
        <div class="shelf-pending" role="status" aria-live="polite">
            <span class="shelf-pending__ring" aria-hidden="true"></span>
            <p class="shelf-pending__label">{ props.label.clone() }</p>
        </div>
    }
}
