//! The weekly cart: `/cart`. The backend keeps it in the HTTP session, so
//! it lives as long as the session cookie.

use crate::call::expect_success;
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use session_gateway::{ApiRequest, Gateway};
use tracing::info;

const MAX_PEOPLE: u32 = 100;

/// A dish planned for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Position in the cart, assigned by the backend.
    #[serde(default)]
    pub id: i32,
    pub dish_id: i64,
    /// `MONDAY` through `SUNDAY`.
    pub day_of_week: String,
    pub people: u32,
}

impl CartEntry {
    pub fn new(dish_id: i64, day_of_week: impl Into<String>, people: u32) -> Self {
        Self {
            id: 0,
            dish_id,
            day_of_week: day_of_week.into().to_ascii_uppercase(),
            people,
        }
    }

    fn validate(&self) -> ApiResult<()> {
        if !(1..=MAX_PEOPLE).contains(&self.people) {
            return Err(ApiError::InvalidInput(format!(
                "People must be between 1 and {}",
                MAX_PEOPLE
            )));
        }
        Ok(())
    }
}

/// Client for the `/cart` endpoints.
#[derive(Clone)]
pub struct CartService {
    gateway: Gateway,
}

impl CartService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn entries(&self) -> ApiResult<Vec<CartEntry>> {
        let response = self.gateway.perform(ApiRequest::get("/cart")).await?;
        let response = expect_success("get_cart", response)?;
        if response.body().is_empty() {
            return Ok(Vec::new());
        }
        Ok(response.json()?)
    }

    /// Add a dish; returns the backend's confirmation message.
    pub async fn add(&self, entry: &CartEntry) -> ApiResult<String> {
        entry.validate()?;
        let request = ApiRequest::post("/cart/add").json(entry)?;
        let response = self.gateway.perform(request).await?;
        let message = expect_success("add_to_cart", response)?.text();
        info!(dish_id = entry.dish_id, day = %entry.day_of_week, "Added dish to cart");
        Ok(message)
    }

    pub async fn edit(&self, id: i32, entry: &CartEntry) -> ApiResult<String> {
        entry.validate()?;
        let request = ApiRequest::put(format!("/cart/edit/{}", id)).json(entry)?;
        let response = self.gateway.perform(request).await?;
        Ok(expect_success("edit_cart", response)?.text())
    }

    pub async fn remove(&self, id: i32) -> ApiResult<String> {
        let response = self
            .gateway
            .perform(ApiRequest::delete(format!("/cart/delete/{}", id)))
            .await?;
        Ok(expect_success("remove_from_cart", response)?.text())
    }

    pub async fn clear(&self) -> ApiResult<String> {
        let response = self.gateway.perform(ApiRequest::delete("/cart/clear")).await?;
        let message = expect_success("clear_cart", response)?.text();
        info!("Cleared cart");
        Ok(message)
    }
}
