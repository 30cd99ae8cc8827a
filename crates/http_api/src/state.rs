use app_api::AppContext;

/// Header carrying the API token when the server is configured with one.
pub const TOKEN_HEADER: &str = "x-storage-admin-token";

#[derive(Clone)]
pub struct HttpState {
    pub context: AppContext,
    pub api_token: Option<String>,
}

impl HttpState {
    pub fn new(context: AppContext, api_token: Option<String>) -> Self {
        Self {
            context,
            api_token: api_token.filter(|token| !token.is_empty()),
        }
    }
}
