//! User administration and account data: `/users`.

use crate::call::{expect_success, with_query, PageRequest};
use crate::error::{ApiError, ApiResult};
use auth_service::UserProfile;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use session_gateway::{ApiRequest, Gateway};
use tracing::info;

/// One page of `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    pub total_elements: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    /// Role name such as `ADMIN` or `USER`.
    pub user_type: Option<String>,
    pub page: PageRequest,
}

impl UserFilter {
    fn path(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(user_type) = self.user_type.as_deref() {
            pairs.push(("type", user_type.to_ascii_uppercase()));
        }
        self.page.append_to(&mut pairs);
        with_query("/users", &pairs)
    }
}

/// Body of `PUT /users/email`. A changed email is confirmed by mail
/// before it takes effect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
}

/// The signed-in user's data archive.
#[derive(Debug, Clone)]
pub struct DataExport {
    /// From `Content-Disposition`, when the backend names the file.
    pub file_name: Option<String>,
    pub content: Bytes,
}

fn attachment_file_name(disposition: &str) -> Option<String> {
    disposition.split(';').find_map(|part| {
        let value = part.trim().strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Client for the `/users` endpoints.
#[derive(Clone)]
pub struct UserService {
    gateway: Gateway,
}

impl UserService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Paged user search. Admin only.
    pub async fn list(&self, filter: &UserFilter) -> ApiResult<UserPage> {
        let response = self.gateway.perform(ApiRequest::get(filter.path())).await?;
        Ok(expect_success("list_users", response)?.json()?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<UserProfile> {
        let response = self
            .gateway
            .perform(ApiRequest::get(format!("/users/{}", id)))
            .await?;
        Ok(expect_success("get_user", response)?.json()?)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        if update.email.trim().is_empty() {
            return Err(ApiError::InvalidInput("Email is required".into()));
        }
        let request = ApiRequest::put("/users/email").json(update)?;
        let response = self.gateway.perform(request).await?;
        Ok(expect_success("update_profile", response)?.json()?)
    }

    /// Change a user's role. Admin only.
    pub async fn set_role(&self, id: i64, user_type: &str) -> ApiResult<UserProfile> {
        let pairs = vec![("type", user_type.to_ascii_uppercase())];
        let request = ApiRequest::put(with_query(&format!("/users/{}", id), &pairs));
        let response = self.gateway.perform(request).await?;
        let profile: UserProfile = expect_success("set_role", response)?.json()?;
        info!(user_id = id, user_type = ?profile.user_type, "Changed role");
        Ok(profile)
    }

    /// Activate an account without its mailed link. Admin only.
    pub async fn enable(&self, id: i64) -> ApiResult<UserProfile> {
        let response = self
            .gateway
            .perform(ApiRequest::put(format!("/users/enable/{}", id)))
            .await?;
        Ok(expect_success("enable_user", response)?.json()?)
    }

    /// Delete another user's account. Admin only.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let response = self
            .gateway
            .perform(ApiRequest::delete(format!("/users/{}", id)))
            .await?;
        expect_success("delete_user", response)?;
        info!(user_id = id, "Deleted user");
        Ok(())
    }

    /// Delete the signed-in user's own account.
    pub async fn delete_own_account(&self) -> ApiResult<()> {
        let response = self.gateway.perform(ApiRequest::delete("/users")).await?;
        expect_success("delete_own_account", response)?;
        info!("Deleted own account");
        Ok(())
    }

    /// Download everything the backend stores about the signed-in user.
    pub async fn export_data(&self) -> ApiResult<DataExport> {
        let response = self
            .gateway
            .perform(ApiRequest::get("/users/data/export"))
            .await?;
        let response = expect_success("export_data", response)?;
        Ok(DataExport {
            file_name: response
                .headers()
                .get("content-disposition")
                .and_then(|value| attachment_file_name(value)),
            content: response.body().clone(),
        })
    }
}
