//! Saved grocery lists: `/grocerylists`.

use crate::call::{expect_success, with_query, PageRequest};
use crate::error::{ApiError, ApiResult};
use crate::ingredients::Ingredient;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use session_gateway::{ApiRequest, Gateway};
use std::collections::BTreeMap;
use tracing::info;

/// Local date-time as the backend reads it from a query string.
const QUERY_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A grocery list saved from a week's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    pub id: i64,
    pub start_of_week: NaiveDateTime,
    pub end_of_week: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryListItem {
    pub ingredient: Ingredient,
    pub quantity: f64,
}

/// One page of a list's ingredients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryListItems {
    #[serde(default)]
    pub ingredients: Vec<GroceryListItem>,
    pub total_elements: u64,
    pub total_pages: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuantitiesBody<'a> {
    ingredients_with_quantity: &'a BTreeMap<i64, f64>,
}

/// Client for the `/grocerylists` endpoints.
#[derive(Clone)]
pub struct GroceryListService {
    gateway: Gateway,
}

impl GroceryListService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Lists of the signed-in user.
    pub async fn list(&self) -> ApiResult<Vec<GroceryList>> {
        let response = self.gateway.perform(ApiRequest::get("/grocerylists")).await?;
        Ok(expect_success("list_grocery_lists", response)?.json()?)
    }

    pub async fn items(&self, id: i64, page: PageRequest) -> ApiResult<GroceryListItems> {
        let mut pairs = Vec::new();
        page.append_to(&mut pairs);
        let path = with_query(&format!("/grocerylists/{}/ingredients", id), &pairs);
        let response = self.gateway.perform(ApiRequest::get(path)).await?;
        Ok(expect_success("grocery_list_items", response)?.json()?)
    }

    /// Replace the quantities of a list, keyed by ingredient id.
    pub async fn set_quantities(&self, id: i64, quantities: &BTreeMap<i64, f64>) -> ApiResult<()> {
        if quantities.values().any(|quantity| *quantity < 0.0) {
            return Err(ApiError::InvalidInput("Quantities cannot be negative".into()));
        }
        let request = ApiRequest::put(format!("/grocerylists/{}", id)).json(&QuantitiesBody {
            ingredients_with_quantity: quantities,
        })?;
        let response = self.gateway.perform(request).await?;
        expect_success("set_grocery_list_quantities", response)?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let response = self
            .gateway
            .perform(ApiRequest::delete(format!("/grocerylists/{}", id)))
            .await?;
        expect_success("delete_grocery_list", response)?;
        info!(grocery_list_id = id, "Deleted grocery list");
        Ok(())
    }

    /// Turn the session's cart into a grocery list for the given week.
    /// The backend empties the cart afterwards and answers 400 when it
    /// was already empty.
    pub async fn save_cart(&self, start_of_week: NaiveDateTime, end_of_week: NaiveDateTime) -> ApiResult<()> {
        if end_of_week < start_of_week {
            return Err(ApiError::InvalidInput("Week ends before it starts".into()));
        }
        let pairs = vec![
            ("startOfWeek", start_of_week.format(QUERY_DATETIME_FORMAT).to_string()),
            ("endOfWeek", end_of_week.format(QUERY_DATETIME_FORMAT).to_string()),
        ];
        let request = ApiRequest::post(with_query("/grocerylists/save", &pairs));
        let response = self.gateway.perform(request).await?;
        expect_success("save_cart", response)?;
        info!(%start_of_week, "Saved cart as grocery list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_reads_local_datetimes() {
        let lists: Vec<GroceryList> = serde_json::from_value(serde_json::json!([
            {"id": 1, "startOfWeek": "2026-10-12T00:00:00", "endOfWeek": "2026-10-18T23:59:59.999"}
        ]))
        .unwrap();
        assert_eq!(lists[0].start_of_week.format("%Y-%m-%d").to_string(), "2026-10-12");
    }

    #[test]
    fn test_quantities_body_keys_are_ingredient_ids() {
        let quantities = BTreeMap::from([(4, 2.5), (9, 1.0)]);
        let body = serde_json::to_value(QuantitiesBody {
            ingredients_with_quantity: &quantities,
        })
        .unwrap();
        assert_eq!(body["ingredientsWithQuantity"]["4"], 2.5);
        assert_eq!(body["ingredientsWithQuantity"]["9"], 1.0);
    }
}
