use serde_derive::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GatewayResponse {
    pub display_text: String,
    pub structured_payload: Option<Value>,
}

impl GatewayResponse {
    pub fn plain(text: &str) -> GatewayResponse {
        return GatewayResponse {
            display_text: text.to_string(),
            structured_payload: None,
        };
    }
}
