// src/models/report.rs
//
// Chips: o resultado efêmero (não persistido) da conciliação de um dia —
// uma unidade por aula registrada e uma por sessão fora da agenda.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::attendance::{SessionId, WorkSession};

// A classe visual do chip, herdada do front: também funciona como etiqueta
// de estado (azul = neutro/em andamento, laranja = atenção, verde = papel
// atribuído, cinza = ausência, waiting = aguardando escolha de papel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ChipStyle {
    #[serde(rename = "chip-blue")]
    Blue,
    #[serde(rename = "chip-orange")]
    Orange,
    #[serde(rename = "chip-green")]
    Green,
    #[serde(rename = "chip-gray")]
    Gray,
    #[serde(rename = "chip-waiting")]
    Waiting,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chip {
    pub text: String,

    #[serde(rename = "class")]
    pub style: ChipStyle,

    // Minutos pagos deste chip; a agenda limita o pagamento, não o relógio.
    pub paid_minutes: i64,

    pub tooltip: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub session_id: Option<SessionId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_data: Option<WorkSession>,

    // Chip clicável abre a escolha de papel de pagamento.
    pub is_clickable: bool,

    // Marca chips vindos de aula registrada (filtro "giáo viên").
    pub is_teaching: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    pub date: String,
    pub chips: Vec<Chip>,
    pub paid_minutes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: String,
    pub staff_id: String,
    pub days: Vec<DayReport>,
    pub total_minutes: i64,
}

// Filtro de categoria de papel usado no fechamento de salário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum RoleFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "giao-vien")]
    Teaching,
    #[serde(rename = "tiep-tan")]
    FrontDesk,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalarySummary {
    pub month: String,
    pub staff_id: String,
    pub filter: RoleFilter,
    pub total_minutes: i64,
    // Σ paid_minutes/60 × role_rate sobre os chips incluídos no filtro.
    pub gross_salary: f64,
    // Σ dos lançamentos da folha de avaliação (pode ser negativo).
    pub bonus_total: f64,
    pub advance: f64,
    // gross + bonus − advance.
    pub net_salary: f64,
}
