// src/models/schedule.rs
//
// Um documento de agenda por dia, com seis seções fixas (duas da manhã,
// duas da tarde, duas da noite). A identidade de uma linha dentro da seção é
// o índice posicional: deletar uma linha desloca os índices seguintes, então
// qualquer referência a "linha N" só vale até a próxima edição estrutural.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Morning1,
    Morning2,
    Afternoon1,
    Afternoon2,
    Evening1,
    Evening2,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Morning1,
        Section::Morning2,
        Section::Afternoon1,
        Section::Afternoon2,
        Section::Evening1,
        Section::Evening2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Morning1 => "morning1",
            Section::Morning2 => "morning2",
            Section::Afternoon1 => "afternoon1",
            Section::Afternoon2 => "afternoon2",
            Section::Evening1 => "evening1",
            Section::Evening2 => "evening2",
        }
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|sec| sec.as_str() == s)
            .ok_or_else(|| format!("seção desconhecida: {s}"))
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Registro de um professor numa linha, chaveado por id (sem duplicatas).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherRegistration {
    pub id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

// Uma linha de aula. `gv` é o nome do professor em texto livre, herdado do
// fluxo antigo em que a recepção digitava o nome antes de existir o botão
// de auto-registro.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ClassRow {
    // HH:mm no horário local do centro.
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,

    // Nome da turma.
    #[serde(default)]
    pub lop: String,
    // Sala.
    #[serde(default)]
    pub phong: String,
    // Professor (texto livre, legado).
    #[serde(default)]
    pub gv: String,
    #[serde(default)]
    pub note: String,

    #[serde(rename = "registeredTeachers", default, skip_serializing_if = "Vec::is_empty")]
    pub registered_teachers: Vec<TeacherRegistration>,
}

impl ClassRow {
    pub fn registration_of(&self, user_id: &str) -> Option<usize> {
        self.registered_teachers.iter().position(|t| t.id == user_id)
    }

    // Toggle simétrico: registra se ausente, cancela se presente. Devolve
    // true quando o usuário ficou registrado.
    pub fn toggle_registration(
        &mut self,
        user_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> bool {
        match self.registration_of(user_id) {
            Some(pos) => {
                self.registered_teachers.remove(pos);
                false
            }
            None => {
                self.registered_teachers.push(TeacherRegistration {
                    id: user_id.to_string(),
                    name: name.to_string(),
                    timestamp: now,
                });
                true
            }
        }
    }
}

// O documento do dia. Cada seção é opcional para que o documento persista
// exatamente com as chaves que o autor gravou (presença ≠ lista vazia).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScheduleDay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning1: Option<Vec<ClassRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning2: Option<Vec<ClassRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon1: Option<Vec<ClassRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon2: Option<Vec<ClassRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening1: Option<Vec<ClassRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening2: Option<Vec<ClassRow>>,
}

impl ScheduleDay {
    fn slot(&self, section: Section) -> &Option<Vec<ClassRow>> {
        match section {
            Section::Morning1 => &self.morning1,
            Section::Morning2 => &self.morning2,
            Section::Afternoon1 => &self.afternoon1,
            Section::Afternoon2 => &self.afternoon2,
            Section::Evening1 => &self.evening1,
            Section::Evening2 => &self.evening2,
        }
    }

    fn slot_mut(&mut self, section: Section) -> &mut Option<Vec<ClassRow>> {
        match section {
            Section::Morning1 => &mut self.morning1,
            Section::Morning2 => &mut self.morning2,
            Section::Afternoon1 => &mut self.afternoon1,
            Section::Afternoon2 => &mut self.afternoon2,
            Section::Evening1 => &mut self.evening1,
            Section::Evening2 => &mut self.evening2,
        }
    }

    pub fn rows(&self, section: Section) -> &[ClassRow] {
        self.slot(section).as_deref().unwrap_or(&[])
    }

    pub fn rows_mut(&mut self, section: Section) -> &mut Vec<ClassRow> {
        self.slot_mut(section).get_or_insert_with(Vec::new)
    }

    // "Documento explícito" = gravado com pelo menos uma chave de seção,
    // mesmo que a lista esteja vazia. Só documentos sem chave nenhuma caem
    // na herança do vizinho.
    pub fn has_any_section(&self) -> bool {
        Section::ALL.iter().any(|s| self.slot(*s).is_some())
    }

    // Cópia-modelo para herança: as linhas vêm junto, os registros não.
    pub fn sanitized(mut self) -> Self {
        for section in Section::ALL {
            if let Some(rows) = self.slot_mut(section) {
                for row in rows.iter_mut() {
                    row.registered_teachers.clear();
                }
            }
        }
        self
    }
}

// Índice global: dia da semana (0 = domingo ... 6 = sábado, convenção do
// front antigo) → lista ordenada de chaves de dia com agenda explícita.
// Usado para achar o vizinho-modelo mais próximo de um dia sem agenda.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleManifest {
    #[serde(default)]
    pub days: BTreeMap<u8, Vec<String>>,
}

impl ScheduleManifest {
    // Insere mantendo a lista ordenada e sem duplicatas.
    pub fn insert(&mut self, weekday: u8, date_key: &str) -> bool {
        let list = self.days.entry(weekday).or_default();
        match list.binary_search_by(|k| k.as_str().cmp(date_key)) {
            Ok(_) => false,
            Err(pos) => {
                list.insert(pos, date_key.to_string());
                true
            }
        }
    }

    // O maior dia estritamente anterior a `date_key` no mesmo dia da
    // semana. Chaves YYYY-MM-DD ordenam lexicograficamente.
    pub fn nearest_before(&self, weekday: u8, date_key: &str) -> Option<&str> {
        self.days
            .get(&weekday)?
            .iter()
            .filter(|k| k.as_str() < date_key)
            .next_back()
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(start: &str, end: &str, lop: &str) -> ClassRow {
        ClassRow {
            start: start.into(),
            end: end.into(),
            lop: lop.into(),
            ..Default::default()
        }
    }

    #[test]
    fn day_round_trips_partial_documents() {
        let mut day = ScheduleDay::default();
        day.rows_mut(Section::Morning1).push(row("07:30", "09:00", "KID-1"));
        day.evening2 = Some(Vec::new());

        let json = serde_json::to_value(&day).unwrap();
        // Seções nunca gravadas não aparecem no documento.
        assert!(json.get("afternoon1").is_none());
        // Seção gravada vazia continua presente.
        assert_eq!(json["evening2"], serde_json::json!([]));

        let back: ScheduleDay = serde_json::from_value(json).unwrap();
        assert!(back.has_any_section());
        assert_eq!(back.rows(Section::Morning1).len(), 1);
        assert!(back.evening2.is_some());
    }

    #[test]
    fn sanitized_clears_registrations_but_keeps_rows() {
        let mut day = ScheduleDay::default();
        let mut r = row("07:30", "09:00", "KID-1");
        r.registered_teachers.push(TeacherRegistration {
            id: "nv_1".into(),
            name: "Lan".into(),
            timestamp: "2026-03-02T00:00:00Z".parse().unwrap(),
        });
        day.rows_mut(Section::Morning1).push(r);

        let template = day.sanitized();
        let rows = template.rows(Section::Morning1);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].registered_teachers.is_empty());
        assert_eq!(rows[0].lop, "KID-1");
    }

    #[test]
    fn registration_toggle_is_symmetric() {
        let mut r = row("07:30", "09:00", "KID-1");
        let now = "2026-03-02T00:00:00Z".parse().unwrap();

        assert!(r.toggle_registration("nv_1", "Lan", now));
        assert_eq!(r.registration_of("nv_1"), Some(0));

        // O segundo toggle devolve a linha ao estado original.
        assert!(!r.toggle_registration("nv_1", "Lan", now));
        assert!(r.registered_teachers.is_empty());

        // Toggles de usuários diferentes não interferem entre si.
        r.toggle_registration("nv_1", "Lan", now);
        r.toggle_registration("nv_2", "Minh", now);
        r.toggle_registration("nv_1", "Lan", now);
        assert_eq!(r.registered_teachers.len(), 1);
        assert_eq!(r.registered_teachers[0].id, "nv_2");
    }

    #[test]
    fn manifest_keeps_sorted_unique_lists() {
        let mut manifest = ScheduleManifest::default();
        assert!(manifest.insert(1, "2026-03-09"));
        assert!(manifest.insert(1, "2026-02-23"));
        assert!(manifest.insert(1, "2026-03-02"));
        assert!(!manifest.insert(1, "2026-03-02"));

        assert_eq!(
            manifest.days.get(&1).unwrap(),
            &vec!["2026-02-23".to_string(), "2026-03-02".into(), "2026-03-09".into()]
        );
    }

    #[test]
    fn nearest_before_is_strictly_prior_same_weekday() {
        let mut manifest = ScheduleManifest::default();
        manifest.insert(1, "2026-02-23");
        manifest.insert(1, "2026-03-02");
        manifest.insert(1, "2026-03-09");

        assert_eq!(manifest.nearest_before(1, "2026-03-09"), Some("2026-03-02"));
        // O próprio dia nunca é vizinho de si mesmo.
        assert_eq!(manifest.nearest_before(1, "2026-02-23"), None);
        assert_eq!(manifest.nearest_before(3, "2026-03-09"), None);
    }
}
