use serde::Deserialize;

/// Gateway-level settings, passed into service constructors at
/// composition time. There is no global configuration state.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Identifier orders carry in their payment-method field.
    #[serde(default = "default_gateway_id")]
    pub gateway_id: String,

    /// Two-letter country of the merchant account. Level-3 data is only
    /// built for US accounts.
    #[serde(default = "default_account_country")]
    pub account_country: String,

    /// Store postcode, used as the level-3 ship-from zip.
    #[serde(default)]
    pub store_postcode: Option<String>,

    /// Fraud services enabled on the account. Order tracking requires
    /// "sift".
    #[serde(default)]
    pub fraud_services: Vec<String>,
}

fn default_gateway_id() -> String {
    "paylane".to_string()
}

fn default_account_country() -> String {
    "US".to_string()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            gateway_id: default_gateway_id(),
            account_country: default_account_country(),
            store_postcode: None,
            fraud_services: Vec::new(),
        }
    }
}

impl GatewaySettings {
    pub fn sift_enabled(&self) -> bool {
        self.fraud_services.iter().any(|s| s == "sift")
    }
}
