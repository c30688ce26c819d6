//! Lead-capture form model: draft, field validation, submission status.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::RegistrationError;
use crate::lifecycle::StateHandle;

/// Careers offered in the selector.
pub const CAREERS: [&str; 13] = [
    "Derecho",
    "Ingeniería Eléctrica",
    "Ingeniería en Sistemas Inteligentes",
    "Ingeniería en Biomedicina",
    "Licenciatura en Administración de Empresas",
    "Licenciatura en Auditoría y Control de Gestión",
    "Licenciatura en Ciencias de la Educación",
    "Licenciatura en Contabilidad y Finanzas",
    "Licenciatura en Enfermería",
    "Licenciatura en Fisioterapia",
    "Licenciatura en Psicología",
    "Licenciatura en Seguridad y Salud Ocupacional",
    "Odontología",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Nombre,
    Cedula,
    Correo,
    Celular,
    Carrera,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Nombre,
        Field::Cedula,
        Field::Correo,
        Field::Celular,
        Field::Carrera,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Nombre => "Nombre Completo:",
            Field::Cedula => "Cédula:",
            Field::Correo => "Correo Electrónico:",
            Field::Celular => "Celular:",
            Field::Carrera => "Carrera:",
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            Field::Nombre => "Nombre completo es requerido",
            Field::Cedula => "Cédula es requerida",
            Field::Correo => "Correo electrónico es requerido",
            Field::Celular => "Celular es requerido",
            Field::Carrera => "Debe seleccionar una carrera",
        }
    }

    fn format_message(self) -> Option<&'static str> {
        match self {
            Field::Cedula => Some("Cédula debe tener 10 dígitos"),
            Field::Correo => Some("Correo electrónico no válido"),
            Field::Celular => Some("Celular no válido (ej: 0987654321 o +593987654321)"),
            Field::Nombre | Field::Carrera => None,
        }
    }
}

/// The lead record, serialised as the `POST /pre-registro` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub nombre: String,
    pub cedula: String,
    pub correo: String,
    pub celular: String,
    pub carrera: String,
}

impl RegistrationDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Nombre => &self.nombre,
            Field::Cedula => &self.cedula,
            Field::Correo => &self.correo,
            Field::Celular => &self.celular,
            Field::Carrera => &self.carrera,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Nombre => &mut self.nombre,
            Field::Cedula => &mut self.cedula,
            Field::Correo => &mut self.correo,
            Field::Celular => &mut self.celular,
            Field::Carrera => &mut self.carrera,
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Needs a dot with text on both sides somewhere in the domain.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn is_valid_cedula(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}

/// `09` + 8 digits, or `+593` + 9 digits.
pub fn is_valid_celular(value: &str) -> bool {
    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    if let Some(rest) = value.strip_prefix("+593") {
        return digits(rest, 9);
    }
    if let Some(rest) = value.strip_prefix("09") {
        return digits(rest, 8);
    }
    false
}

fn format_ok(field: Field, value: &str) -> bool {
    match field {
        Field::Cedula => is_valid_cedula(value),
        Field::Correo => is_valid_email(value),
        Field::Celular => is_valid_celular(value),
        Field::Nombre | Field::Carrera => true,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Editing,
    Submitting,
    Succeeded,
    Failed(String),
}

/// Form state: draft values, per-field errors, submission status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    draft: RegistrationDraft,
    errors: [Option<&'static str>; 5],
    status: FormStatus,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors[field as usize]
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(Option::is_some)
    }

    /// Record a keystroke; only format rules apply while typing.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        self.errors[field as usize] = if !value.is_empty() && !format_ok(field, &value) {
            field.format_message()
        } else {
            None
        };
        *self.draft.slot(field) = value;
    }

    /// Full check run on submit. Returns whether the draft may be sent.
    pub fn validate(&mut self) -> bool {
        for field in Field::ALL {
            let value = self.draft.get(field);
            let blank = match field {
                Field::Nombre => value.trim().is_empty(),
                _ => value.is_empty(),
            };
            let error = if blank {
                Some(field.required_message())
            } else if !format_ok(field, value) {
                field.format_message()
            } else {
                None
            };
            self.errors[field as usize] = error;
        }
        !self.has_errors()
    }

    /// Validate and move to `Submitting`. Returns the body to send.
    pub fn begin_submit(&mut self) -> Option<RegistrationDraft> {
        if self.status == FormStatus::Submitting || self.status == FormStatus::Succeeded {
            return None;
        }
        if !self.validate() {
            return None;
        }
        self.status = FormStatus::Submitting;
        Some(self.draft.clone())
    }

    pub fn finish_submit(&mut self, result: Result<(), RegistrationError>) {
        self.status = match result {
            Ok(()) => FormStatus::Succeeded,
            Err(err) => FormStatus::Failed(err.user_message()),
        };
    }
}

/// Transport to the registration endpoint.
#[allow(async_fn_in_trait)]
pub trait RegistrationService {
    async fn submit(&self, draft: &RegistrationDraft) -> Result<(), RegistrationError>;
}

/// Validate, submit, and record the outcome. Returns `true` on success.
pub async fn submit_registration<H, S>(form: &H, service: &S) -> bool
where
    H: StateHandle<RegistrationForm>,
    S: RegistrationService,
{
    let Some(draft) = form.update(|f| f.begin_submit()) else {
        return false;
    };
    let result = service.submit(&draft).await;
    match &result {
        Ok(()) => info!(carrera = %draft.carrera, "pre-registration accepted"),
        Err(err) => warn!(error = %err, "pre-registration failed"),
    }
    let succeeded = result.is_ok();
    form.update(|f| f.finish_submit(result));
    succeeded
}
