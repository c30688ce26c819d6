use dioxus::prelude::*;

use super::chat_view::ChatWidget;
use super::registration_form::RegistrationFormView;
use super::session::use_chat_session_provider;

/// Institutional sections linked from the top bar.
const NAV_LINKS: [(&str, &str); 6] = [
    ("LA UBE", "https://www.ube.edu.ec/"),
    ("EDUCACIÓN", "https://ube.edu.ec/Oferta_academica"),
    ("INVESTIGACIÓN", "https://investigacion.ube.edu.ec/"),
    ("VINCULACIÓN", "https://ube.edu.ec/Vinculacion"),
    ("CRAI", "https://crai.ube.edu.ec/"),
    ("ADMISIONES", "https://ube.edu.ec/Admisiones"),
];

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Chat {},
    #[route("/registro")]
    Registro {},
}

#[component]
pub fn App() -> Element {
    rsx! { Router::<Route> {} }
}

#[component]
fn AppLayout() -> Element {
    rsx! {
        div { class: "chat-app-container",
            nav { class: "top-navbar",
                for (label, href) in NAV_LINKS {
                    a {
                        class: "nav-link",
                        href: "{href}",
                        target: "_blank",
                        rel: "noopener noreferrer",
                        "{label}"
                    }
                }
            }
            Outlet::<Route> {}
        }
    }
}

#[component]
fn Chat() -> Element {
    rsx! { ChatWidget {} }
}

/// Standalone form page. Owns its own session; closing returns to the chat.
#[component]
fn Registro() -> Element {
    use_chat_session_provider();
    let nav = use_navigator();

    rsx! {
        div { class: "registro-page",
            button {
                class: "registro-close-btn",
                onclick: move |_| {
                    nav.push(Route::Chat {});
                },
                "×"
            }
            RegistrationFormView {}
        }
    }
}
