// src/models/salary.rs
//
// Configuração de pagamento por funcionário (vários papéis com valor-hora)
// e a folha mensal de avaliação que o admin preenche no fechamento.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Um papel de pagamento: valor-hora nomeado. Referenciado POR VALOR a
// partir das sessões (snapshot em role_rate), para que o histórico não mude
// quando o valor for reajustado.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalaryRole {
    pub id: String,
    pub name: String,
    // VND por hora.
    pub rate: f64,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SalaryConfig {
    #[serde(default)]
    pub roles: Vec<SalaryRole>,

    // Campos do formato antigo de valor único; mantidos para leitura.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<f64>,
}

impl SalaryConfig {
    // Lista efetiva de papéis: se só existe o `rate` antigo, ele aparece
    // como um papel padrão sintetizado (mesmo fallback do cadastro antigo).
    pub fn effective_roles(&self) -> Vec<SalaryRole> {
        if self.roles.is_empty() {
            if let Some(rate) = self.rate {
                return vec![SalaryRole {
                    id: "default".into(),
                    name: "Mặc định (Cũ)".into(),
                    rate,
                    is_default: true,
                }];
            }
        }
        self.roles.clone()
    }

    pub fn rate_of(&self, role_id: &str) -> Option<f64> {
        self.roles.iter().find(|r| r.id == role_id).map(|r| r.rate)
    }
}

// Os dez critérios fixos da folha de avaliação. Labels/tooltips são os do
// formulário impresso do centro; o template pré-preenche a nota.
pub struct EvaluationCriterion {
    pub label: &'static str,
    pub tooltip: &'static str,
    pub template: Option<&'static str>,
}

pub const EVALUATION_CRITERIA: [EvaluationCriterion; 10] = [
    EvaluationCriterion {
        label: "I",
        tooltip: "CHUYÊN CẦN – TÁC PHONG",
        template: Some("Vắng phép: ...; Vắng đột xuất: ...; Vắng không phép: ..."),
    },
    EvaluationCriterion {
        label: "II",
        tooltip: "ĐÚNG GIỜ",
        template: Some("Trễ: ... giờ; Số lần trễ: ... lần"),
    },
    EvaluationCriterion { label: "III", tooltip: "TẬP TRUNG LÀM VIỆC", template: None },
    EvaluationCriterion { label: "IV", tooltip: "NHIỆT TÌNH", template: None },
    EvaluationCriterion { label: "V", tooltip: "TRÁCH NHIỆM", template: None },
    EvaluationCriterion { label: "VI", tooltip: "SOẠN BÀI / NHẬN XÉT", template: None },
    EvaluationCriterion { label: "VII", tooltip: "CHUYÊN MÔN", template: None },
    EvaluationCriterion { label: "VIII", tooltip: "KỸ NĂNG SƯ PHẠM", template: None },
    EvaluationCriterion { label: "IX", tooltip: "SỐ GIỜ LÀM", template: None },
    EvaluationCriterion {
        label: "X",
        tooltip: "HỌP ĐỊNH KÌ",
        template: Some("Tiếng Anh: ...; T-TV: ...; TTD: ...; (0: vắng; có: đi họp; x: không dạy)"),
    },
];

// A forma serializável dos critérios, para a tela montar a tabela.
#[derive(Debug, Serialize, ToSchema)]
pub struct CriterionInfo {
    pub id: usize,
    pub label: String,
    pub tooltip: String,
    pub template: Option<String>,
}

pub fn criteria_info() -> Vec<CriterionInfo> {
    EVALUATION_CRITERIA
        .iter()
        .enumerate()
        .map(|(id, c)| CriterionInfo {
            id,
            label: c.label.to_string(),
            tooltip: c.tooltip.to_string(),
            template: c.template.map(str::to_string),
        })
        .collect()
}

// Lançamento de um critério: valor assinado em VND + observação livre.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EvaluationEntry {
    pub id: usize,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

// A folha do mês de um funcionário: avaliação + adiantamento declarado.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalarySheet {
    pub staff_id: String,
    // "YYYY-MM"
    pub month: String,
    #[serde(default)]
    pub advance: f64,
    #[serde(default)]
    pub evaluation: Vec<EvaluationEntry>,
}

impl SalarySheet {
    pub fn empty(staff_id: &str, month: &str) -> Self {
        Self {
            staff_id: staff_id.to_string(),
            month: month.to_string(),
            advance: 0.0,
            evaluation: Vec::new(),
        }
    }

    pub fn bonus_total(&self) -> f64 {
        self.evaluation.iter().map(|e| e.amount).sum()
    }
}
