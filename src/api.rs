use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{Application, ContactForm, Decision, NewProperty, Property, Role, User};

#[derive(Debug)]
pub enum ApiError {
    /// Non-2xx response; carries the server-supplied message when present.
    Status { status: u16, message: String },
    /// Connection or decode failure before a usable response existed.
    Transport(reqwest::Error),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { message, .. } => f.write_str(message),
            Self::Transport(e) => write!(f, "request failed: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Status { .. } => None,
            Self::Transport(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSuccess {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// An image file already read from disk, ready to forward as a multipart part.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("rently")
            .build()
            .expect("reqwest client");
        Self { base, client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base.trim_end_matches('/'))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, ApiError> {
        let resp = self
            .client
            .post(self.endpoint("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        json_or_message(resp).await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthSuccess, ApiError> {
        let resp = self
            .client
            .post(self.endpoint("/api/auth/register"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "role": role,
            }))
            .send()
            .await?;
        json_or_message(resp).await
    }

    pub async fn owner_properties(&self, token: &str) -> Result<Vec<Property>, ApiError> {
        let resp = self
            .client
            .get(self.endpoint("/api/owner/properties"))
            .bearer_auth(token)
            .send()
            .await?;
        json_or_message(resp).await
    }

    pub async fn add_property(
        &self,
        token: &str,
        fields: &NewProperty,
        image: Option<ImageUpload>,
    ) -> Result<(), ApiError> {
        let mut form = reqwest::multipart::Form::new()
            .text("title", fields.title.clone())
            .text("description", fields.description.clone())
            .text("address", fields.address.clone())
            .text("price", fields.price.clone());
        if let Some(image) = image {
            form = form.part(
                "image",
                reqwest::multipart::Part::bytes(image.bytes).file_name(image.file_name),
            );
        }
        let resp = self
            .client
            .post(self.endpoint("/api/owner/add-property"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(())
    }

    pub async fn handle_request(
        &self,
        token: &str,
        request_id: &str,
        action: Decision,
    ) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.endpoint("/api/owner/handle-request"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "requestId": request_id, "action": action }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(())
    }

    pub async fn explore(&self, token: &str) -> Result<Vec<Property>, ApiError> {
        let resp = self
            .client
            .get(self.endpoint("/api/tenant/explore"))
            .bearer_auth(token)
            .send()
            .await?;
        json_or_message(resp).await
    }

    pub async fn applications(&self, token: &str) -> Result<Vec<Application>, ApiError> {
        let resp = self
            .client
            .get(self.endpoint("/api/tenant/applications"))
            .bearer_auth(token)
            .send()
            .await?;
        json_or_message(resp).await
    }

    pub async fn apply(&self, token: &str, property_id: &str) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.endpoint("/api/tenant/apply"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "propertyId": property_id }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(success_message(resp, "application sent").await)
    }

    pub async fn contact(&self, form: &ContactForm) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.endpoint("/api/contact"))
            .json(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(success_message(resp, "message sent").await)
    }

    /// Public listing; the only endpoint that needs no session.
    pub async fn public_properties(&self) -> Result<Vec<Property>, ApiError> {
        let resp = self
            .client
            .get(self.endpoint("/api/properties"))
            .send()
            .await?;
        json_or_message(resp).await
    }
}

async fn json_or_message<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    if !resp.status().is_success() {
        return Err(status_error(resp).await);
    }
    Ok(resp.json::<T>().await?)
}

async fn status_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let message = resp
        .json::<MessageBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("request failed with status {status}"));
    ApiError::Status { status, message }
}

async fn success_message(resp: reqwest::Response, fallback: &str) -> String {
    resp.json::<MessageBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| fallback.to_string())
}
