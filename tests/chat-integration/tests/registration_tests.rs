use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use sara_chat_integration::harness::{unreachable_base_url, MockBackend, Scripted};
use sara_chat_integration::{test_config, valid_draft, ReqwestBackend, TokioDelay};
use sara_common::api::REGISTRATION_FALLBACK;
use sara_common::overlay::{close_after_grace, RegistrationOverlay};
use sara_common::registration::{submit_registration, Field, FormStatus, RegistrationForm};

fn filled_form() -> Rc<RefCell<RegistrationForm>> {
    let draft = valid_draft();
    let mut form = RegistrationForm::new();
    for field in Field::ALL {
        form.edit(field, draft.get(field));
    }
    Rc::new(RefCell::new(form))
}

#[tokio::test]
async fn accepted_lead_is_posted_with_backend_field_names() {
    let mock = MockBackend::start().await;
    let config = test_config(&mock.base_url);
    let form = filled_form();

    assert!(submit_registration(&form, &ReqwestBackend::new(&config)).await);

    assert_eq!(form.borrow().status(), &FormStatus::Succeeded);
    assert_eq!(
        mock.registrations().await,
        vec![json!({
            "nombre": "María Fernanda Loor",
            "cedula": "0923456781",
            "correo": "maria.loor@example.com",
            "celular": "+593987654321",
            "carrera": "Licenciatura en Psicología",
        })]
    );
}

#[tokio::test]
async fn rejection_detail_is_shown_verbatim() {
    let mock = MockBackend::start().await;
    mock.script_registration(Scripted::json(
        400,
        json!({ "detail": "La cédula ya se encuentra registrada" }),
    ))
    .await;
    let config = test_config(&mock.base_url);
    let form = filled_form();

    assert!(!submit_registration(&form, &ReqwestBackend::new(&config)).await);
    assert_eq!(
        form.borrow().status(),
        &FormStatus::Failed("La cédula ya se encuentra registrada".to_string())
    );
}

#[tokio::test]
async fn schema_errors_fall_back_to_generic_message() {
    let mock = MockBackend::start().await;
    mock.script_registration(Scripted::json(
        422,
        json!({ "detail": [{ "loc": ["body", "correo"], "msg": "field required" }] }),
    ))
    .await;
    let config = test_config(&mock.base_url);
    let form = filled_form();

    submit_registration(&form, &ReqwestBackend::new(&config)).await;
    assert_eq!(
        form.borrow().status(),
        &FormStatus::Failed(REGISTRATION_FALLBACK.to_string())
    );
}

#[tokio::test]
async fn transport_failure_asks_to_retry() {
    let config = test_config(&unreachable_base_url().await);
    let form = filled_form();

    submit_registration(&form, &ReqwestBackend::new(&config)).await;
    assert_eq!(
        form.borrow().status(),
        &FormStatus::Failed("Error al registrar, por favor intente nuevamente".to_string())
    );
}

#[tokio::test]
async fn invalid_form_makes_no_request() {
    let mock = MockBackend::start().await;
    let config = test_config(&mock.base_url);
    let form = filled_form();
    form.borrow_mut().edit(Field::Celular, "12345");

    assert!(!submit_registration(&form, &ReqwestBackend::new(&config)).await);
    assert_eq!(
        form.borrow().error(Field::Celular),
        Some("Celular no válido (ej: 0987654321 o +593987654321)")
    );
    assert!(mock.registrations().await.is_empty());
}

#[tokio::test]
async fn overlay_closes_after_successful_registration() {
    let mock = MockBackend::start().await;
    let config = test_config(&mock.base_url);
    let overlay = Rc::new(RefCell::new(RegistrationOverlay::new()));
    overlay.borrow_mut().toggle();
    let form = filled_form();

    let succeeded = submit_registration(&form, &ReqwestBackend::new(&config)).await;
    assert!(succeeded);
    assert!(overlay.borrow().is_open());

    assert!(close_after_grace(&overlay, &TokioDelay, config.overlay_grace()).await);
    assert!(!overlay.borrow().is_open());
}
