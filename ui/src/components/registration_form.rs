use dioxus::prelude::*;
use tracing::debug;

use sara_common::overlay::close_after_grace;
use sara_common::registration::{submit_registration, Field, FormStatus, CAREERS};

use super::assistant_client::GlooDelay;
use super::session::use_chat_session;

/// Modal pre-registration form, shown while the overlay is open.
#[component]
pub fn RegistrationOverlayView() -> Element {
    let session = use_chat_session();
    if !session.overlay.read().is_open() {
        return rsx! {};
    }

    let on_close = session.clone();

    rsx! {
        div { class: "registro-overlay",
            div { class: "registro-modal",
                button {
                    class: "registro-close-btn",
                    onclick: move |_| on_close.toggle_overlay(),
                    "×"
                }
                RegistrationFormView {}
            }
        }
    }
}

/// Lead form. On success it shows a confirmation and asks the session to
/// close the overlay after the grace period.
#[component]
pub fn RegistrationFormView() -> Element {
    let session = use_chat_session();
    let mut form = session.registration;

    let status = form.read().status().clone();
    if status == FormStatus::Succeeded {
        return rsx! {
            div { class: "registro-confirmation",
                h3 { "¡Registro exitoso!" }
                p { "Gracias por tu interés. Un asesor se pondrá en contacto contigo pronto." }
            }
        };
    }

    let submitting = status == FormStatus::Submitting;
    let draft = form.read().draft().clone();

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = session.backend.clone();
        let form = session.registration_handle();
        let overlay = session.overlay_handle();
        let grace = session.config.overlay_grace();
        let task = session.tasks.track(async move {
            if submit_registration(&form, &backend).await {
                close_after_grace(&overlay, &GlooDelay, grace).await;
            }
        });
        spawn(async move {
            if task.await.is_err() {
                debug!("registration task cancelled");
            }
        });
    };

    rsx! {
        form { class: "registro-form", onsubmit: on_submit,
            h2 { "Pre-registro UBE" }
            for field in [Field::Nombre, Field::Cedula, Field::Correo, Field::Celular] {
                div { class: "form-group", key: "{field.label()}",
                    label { "{field.label()}" }
                    input {
                        r#type: input_type(field),
                        value: "{draft.get(field)}",
                        disabled: submitting,
                        oninput: move |evt| form.write().edit(field, evt.value()),
                    }
                    if let Some(error) = form.read().error(field) {
                        span { class: "form-error", "{error}" }
                    }
                }
            }
            div { class: "form-group",
                label { "{Field::Carrera.label()}" }
                select {
                    value: "{draft.carrera}",
                    disabled: submitting,
                    onchange: move |evt| form.write().edit(Field::Carrera, evt.value()),
                    option { value: "", "Selecciona una carrera" }
                    for career in CAREERS {
                        option { value: "{career}", "{career}" }
                    }
                }
                if let Some(error) = form.read().error(Field::Carrera) {
                    span { class: "form-error", "{error}" }
                }
            }
            if let FormStatus::Failed(message) = &status {
                p { class: "form-error registro-failure", "{message}" }
            }
            button {
                r#type: "submit",
                disabled: submitting,
                if submitting { "Enviando..." } else { "Registrarme" }
            }
        }
    }
}

fn input_type(field: Field) -> &'static str {
    match field {
        Field::Correo => "email",
        Field::Celular => "tel",
        _ => "text",
    }
}
