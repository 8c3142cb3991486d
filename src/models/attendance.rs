// src/models/attendance.rs
//
// O documento de ponto: um registro por (funcionário, dia), com o array
// `sessions` como fonte da verdade e os campos-espelho check_in/check_out
// refletindo sempre a ÚLTIMA sessão (compatibilidade com consultas simples
// do sistema antigo).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Identificador de sessão. Os dados legados misturam dois formatos: um
// timestamp em milissegundos (Date.now() do front antigo) e o marcador
// literal "legacy" das linhas migradas de campo único. O sum type elimina a
// comparação frouxa string-vs-número que o sistema antigo fazia.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionId {
    Timestamp(i64),
    Legacy,
}

impl SessionId {
    pub fn from_instant(now: DateTime<Utc>) -> Self {
        Self::Timestamp(now.timestamp_millis())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timestamp(ms) => write!(f, "{ms}"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

impl std::str::FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "legacy" {
            return Ok(Self::Legacy);
        }
        s.parse::<i64>()
            .map(Self::Timestamp)
            .map_err(|_| format!("id de sessão inválido: {s}"))
    }
}

// Serializa preservando o formato de origem: número para timestamps,
// string para o marcador legado.
impl Serialize for SessionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Timestamp(ms) => serializer.serialize_i64(*ms),
            Self::Legacy => serializer.serialize_str("legacy"),
        }
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = SessionId;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("um timestamp em milissegundos ou a string \"legacy\"")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<SessionId, E> {
                Ok(SessionId::Timestamp(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<SessionId, E> {
                Ok(SessionId::Timestamp(v as i64))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<SessionId, E> {
                // JSON não distingue inteiro de float; dados antigos podem
                // ter sido gravados como 1.7e12.
                Ok(SessionId::Timestamp(v as i64))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<SessionId, E> {
                v.parse::<SessionId>().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

// Procedência de uma sessão criada fora do fluxo normal de check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Manual,
    AdminAdd,
}

// Um trecho contínuo de trabalho. `start` duplica `check_in` por
// compatibilidade com o formato antigo; os dois andam sempre juntos nas
// escritas novas, mas registros legados podem ter só um dos dois.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    // Timestamp em milissegundos ou o marcador "legacy".
    #[schema(value_type = String, example = "1767254400000")]
    pub id: SessionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<DateTime<Utc>>,

    // None ⇒ sessão aberta.
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,

    // Atribuição de papel de pagamento, feita a posteriori. `role_rate` é um
    // snapshot do momento da atribuição, não uma referência viva.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_rate: Option<f64>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SessionKind>,
}

impl WorkSession {
    pub fn new(id: SessionId, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            start: Some(start),
            check_in: Some(start),
            check_out: end,
            role: None,
            role_name: None,
            role_rate: None,
            kind: None,
        }
    }

    // Instante de entrada, preferindo check_in como o sistema antigo
    // (`s.checkIn || s.start`).
    pub fn clock_in(&self) -> Option<DateTime<Utc>> {
        self.check_in.or(self.start)
    }

    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

// Forma como um registro chega do armazenamento: ou já no formato atual
// (array de sessões), ou no formato legado de campo único. O upgrade
// acontece UMA vez, na borda do repositório, nunca nos consumidores.
#[derive(Debug)]
pub enum StoredSessions {
    Current(Vec<WorkSession>),
    Legacy {
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
    },
}

impl StoredSessions {
    pub fn upgrade(self) -> Vec<WorkSession> {
        match self {
            Self::Current(sessions) => sessions,
            Self::Legacy { check_in: Some(start), check_out } => {
                vec![WorkSession::new(SessionId::Legacy, start, check_out)]
            }
            Self::Legacy { check_in: None, .. } => Vec::new(),
        }
    }
}

// O documento por (funcionário, dia). `sessions` manda; os espelhos são
// cache desnormalizado do último elemento e DEVEM ser recalculados a cada
// mutação do array (inclusive delete, que pode remover o último).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDoc {
    pub user_id: String,
    pub name: String,
    // YYYY-MM-DD no dia de calendário local do criador.
    pub date: String,
    pub sessions: Vec<WorkSession>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
}

impl AttendanceDoc {
    // Chave do documento na coleção attendance_logs.
    pub fn doc_id(date_key: &str, user_id: &str) -> String {
        format!("{date_key}_{user_id}")
    }

    pub fn empty(user_id: &str, name: &str, date_key: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            date: date_key.to_string(),
            sessions: Vec::new(),
            check_in: None,
            check_out: None,
        }
    }

    pub fn open_session(&self) -> Option<&WorkSession> {
        self.sessions.iter().find(|s| s.is_open())
    }

    pub fn open_session_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_open()).count()
    }

    pub fn position_of(&self, id: &SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| &s.id == id)
    }

    // Recalcula os espelhos a partir da última sessão (ou NULL se vazio).
    pub fn sync_mirror(&mut self) {
        match self.sessions.last() {
            Some(last) => {
                self.check_in = last.clock_in();
                self.check_out = last.check_out;
            }
            None => {
                self.check_in = None;
                self.check_out = None;
            }
        }
    }

    pub fn push_session(&mut self, session: WorkSession) {
        self.sessions.push(session);
        self.sync_mirror();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn session_id_serde_accepts_all_legacy_shapes() {
        let id: SessionId = serde_json::from_str("1767254400000").unwrap();
        assert_eq!(id, SessionId::Timestamp(1_767_254_400_000));

        let id: SessionId = serde_json::from_str("\"1767254400000\"").unwrap();
        assert_eq!(id, SessionId::Timestamp(1_767_254_400_000));

        let id: SessionId = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(id, SessionId::Legacy);

        assert_eq!(serde_json::to_string(&SessionId::Legacy).unwrap(), "\"legacy\"");
        assert_eq!(
            serde_json::to_string(&SessionId::Timestamp(5)).unwrap(),
            "5"
        );
    }

    #[test]
    fn legacy_record_lifts_to_single_session() {
        let stored = StoredSessions::Legacy {
            check_in: Some(ts("2026-03-02T00:30:00Z")),
            check_out: None,
        };
        let sessions = stored.upgrade();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, SessionId::Legacy);
        assert!(sessions[0].is_open());

        let empty = StoredSessions::Legacy { check_in: None, check_out: None };
        assert!(empty.upgrade().is_empty());
    }

    #[test]
    fn mirror_tracks_last_session() {
        let mut doc = AttendanceDoc::empty("nv_1", "Lan", "2026-03-02");
        doc.push_session(WorkSession::new(
            SessionId::Timestamp(1),
            ts("2026-03-02T00:30:00Z"),
            Some(ts("2026-03-02T02:00:00Z")),
        ));
        doc.push_session(WorkSession::new(
            SessionId::Timestamp(2),
            ts("2026-03-02T07:00:00Z"),
            None,
        ));

        assert_eq!(doc.check_in, Some(ts("2026-03-02T07:00:00Z")));
        assert_eq!(doc.check_out, None);

        // Remover a última sessão deve recuar os espelhos para a anterior.
        doc.sessions.pop();
        doc.sync_mirror();
        assert_eq!(doc.check_in, Some(ts("2026-03-02T00:30:00Z")));
        assert_eq!(doc.check_out, Some(ts("2026-03-02T02:00:00Z")));

        doc.sessions.clear();
        doc.sync_mirror();
        assert_eq!(doc.check_in, None);
        assert_eq!(doc.check_out, None);
    }

    #[test]
    fn at_most_one_open_session_is_observable() {
        let mut doc = AttendanceDoc::empty("nv_1", "Lan", "2026-03-02");
        doc.push_session(WorkSession::new(
            SessionId::Timestamp(1),
            ts("2026-03-02T00:30:00Z"),
            None,
        ));
        assert_eq!(doc.open_session_count(), 1);
        assert!(doc.open_session().is_some());

        doc.sessions[0].check_out = Some(ts("2026-03-02T02:00:00Z"));
        doc.sync_mirror();
        assert_eq!(doc.open_session_count(), 0);
    }
}
