// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("invalid_data", "Invalid data"),
    ("invalid_transition", "This status change is not allowed"),
    ("invalid_date_range", "End date must not be before start date"),
    ("already_exists", "This record already exists"),
    ("campaign_not_found", "Campaign not found"),
    ("lead_not_found", "Lead not found"),
    ("appointment_not_found", "Appointment not found"),
    ("deal_not_found", "Deal not found"),
    ("closer_not_found", "Closer not found"),
    ("internal_error", "Internal server error"),
];

const DE: &[(&str, &str)] = &[
    ("invalid_data", "Ungültige Daten"),
    ("invalid_transition", "Dieser Statuswechsel ist nicht erlaubt"),
    ("invalid_date_range", "Das Enddatum darf nicht vor dem Startdatum liegen"),
    ("already_exists", "Dieser Eintrag existiert bereits"),
    ("campaign_not_found", "Kampagne nicht gefunden"),
    ("lead_not_found", "Lead nicht gefunden"),
    ("appointment_not_found", "Termin nicht gefunden"),
    ("deal_not_found", "Deal nicht gefunden"),
    ("closer_not_found", "Closer nicht gefunden"),
    ("internal_error", "Interner Serverfehler"),
];

const PT: &[(&str, &str)] = &[
    ("invalid_data", "Dados inválidos"),
    ("invalid_transition", "Esta mudança de status não é permitida"),
    ("invalid_date_range", "A data final não pode ser anterior à data inicial"),
    ("already_exists", "Este registro já existe"),
    ("campaign_not_found", "Campanha não encontrada"),
    ("lead_not_found", "Lead não encontrado"),
    ("appointment_not_found", "Consulta não encontrada"),
    ("deal_not_found", "Deal não encontrado"),
    ("closer_not_found", "Closer não encontrado"),
    ("internal_error", "Erro interno do servidor"),
];

/// Catálogo de mensagens por idioma. Idioma desconhecido cai no inglês.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", EN.iter().copied().collect());
        catalogs.insert("de", DE.iter().copied().collect());
        catalogs.insert("pt", PT.iter().copied().collect());
        Self { catalogs }
    }

    pub fn message<'a>(&'a self, lang: &str, key: &'a str) -> &'a str {
        self.catalogs
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .copied()
            .unwrap_or(key)
    }

    /// Mensagem no idioma padrão, para quando o Locale não está disponível.
    pub fn default_message(key: &str) -> &str {
        EN.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, msg)| *msg)
            .unwrap_or(key)
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
