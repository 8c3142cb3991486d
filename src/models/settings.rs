// src/models/settings.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// O documento settings/'system'. Só `allowedIP` tem leitura tipada (o
// check-in consome a lista); os demais toggles globais passam intactos em
// `extra`, e a gravação faz merge sobre o documento existente.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SystemSettings {
    // Lista de IPs permitidos para check-in, separados por vírgula.
    // Vazia/ausente ⇒ sem restrição de rede.
    #[serde(rename = "allowedIP", default, skip_serializing_if = "Option::is_none")]
    pub allowed_ip: Option<String>,

    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, Value>,
}

impl SystemSettings {
    pub fn allowed_ips(&self) -> Vec<String> {
        self.allowed_ip
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_ips_splits_and_trims() {
        let settings = SystemSettings {
            allowed_ip: Some(" 203.0.113.7 ,198.51.100.20,, ".into()),
            extra: Default::default(),
        };
        assert_eq!(settings.allowed_ips(), vec!["203.0.113.7", "198.51.100.20"]);

        assert!(SystemSettings::default().allowed_ips().is_empty());
    }

    #[test]
    fn unknown_toggles_survive_round_trip() {
        let doc = serde_json::json!({
            "allowedIP": "203.0.113.7",
            "maintenanceBanner": true
        });
        let settings: SystemSettings = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&settings).unwrap(), doc);
    }
}
