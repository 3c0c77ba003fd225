use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoreRequest {
    #[serde(default)]
    pub name: String,
}
