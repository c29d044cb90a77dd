use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::common::{
    AccessToken, ChatMessage, ChatRoom, CreatedRoom, Credentials, NewChatRoom, PostedMessage,
};

use super::{ApiError, ApiResult};

/// Thin wrapper over the chat service's REST endpoints.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        endpoint_url(&self.base_url, segments)
            .ok_or_else(|| ApiError::InvalidBaseUrl(self.base_url.to_string()))
    }

    /// `POST /auth/jwt/create/`
    pub async fn authenticate(&self, credentials: &Credentials) -> ApiResult<AccessToken> {
        let url = self.endpoint(&["auth", "jwt", "create"])?;
        let response = self.http.post(url).json(credentials).send().await?;
        read_json(response).await
    }

    /// `GET /communications/chatrooms/user_chats/`
    pub async fn user_chats(&self, token: &str) -> ApiResult<Vec<ChatRoom>> {
        let url = self.endpoint(&["communications", "chatrooms", "user_chats"])?;
        let response = bearer(self.http.get(url), token).send().await?;
        read_json(response).await
    }

    /// `POST /communications/chatrooms/`
    pub async fn create_chat_room(&self, token: &str, room: &NewChatRoom) -> ApiResult<CreatedRoom> {
        let url = self.endpoint(&["communications", "chatrooms"])?;
        let response = bearer(self.http.post(url), token).json(room).send().await?;
        read_json(response).await
    }

    /// `GET /communications/chatrooms/{room_oid}/messages/`
    pub async fn room_messages(&self, token: &str, room_oid: &str) -> ApiResult<Vec<ChatMessage>> {
        let url = self.endpoint(&["communications", "chatrooms", room_oid, "messages"])?;
        let response = bearer(self.http.get(url), token).send().await?;
        read_json(response).await
    }

    /// `POST /messages/{room_oid}/`
    pub async fn post_message(
        &self,
        token: &str,
        room_oid: &str,
        content: &str,
    ) -> ApiResult<PostedMessage> {
        let url = self.endpoint(&["messages", room_oid])?;
        let response = bearer(self.http.post(url), token)
            .json(&json!({ "content": content }))
            .send()
            .await?;
        read_json(response).await
    }
}

/// Appends `segments` to the base path and terminates it with `/`, the way
/// the backend routes are declared. Segments are percent-encoded.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().ok()?;
        path.pop_if_empty();
        path.extend(segments);
        path.push("");
    }
    Some(url)
}

fn bearer(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.bearer_auth(token)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_end_with_slash() {
        let api = ApiClient::new("http://localhost:8000").unwrap();

        assert_eq!(
            api.endpoint(&["auth", "jwt", "create"]).unwrap().as_str(),
            "http://localhost:8000/auth/jwt/create/"
        );
        assert_eq!(
            api.endpoint(&["communications", "chatrooms", "abc123", "messages"])
                .unwrap()
                .as_str(),
            "http://localhost:8000/communications/chatrooms/abc123/messages/"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let api = ApiClient::new("https://gateway.example.com/api/").unwrap();
        assert_eq!(
            api.endpoint(&["messages", "r1"]).unwrap().as_str(),
            "https://gateway.example.com/api/messages/r1/"
        );

        let no_slash = ApiClient::new("https://gateway.example.com/api").unwrap();
        assert_eq!(
            no_slash.endpoint(&["messages", "r1"]).unwrap().as_str(),
            "https://gateway.example.com/api/messages/r1/"
        );
    }

    #[test]
    fn room_oid_is_percent_encoded() {
        let api = ApiClient::new("http://localhost:8000").unwrap();
        let url = api.endpoint(&["messages", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/messages/a%20b%2Fc/");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::Url(_))));
    }
}
