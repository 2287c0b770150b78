//! Ingredient catalogue: `/ingredients`.

use crate::call::{expect_success, with_query, PageRequest};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use session_gateway::{ApiRequest, Gateway};
use tracing::info;

/// An ingredient as the backend returns it. `category` and `unit` are the
/// backend's enum names (e.g. `VEGETABLE`, `GRAM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Owner of a user-defined ingredient; absent for shared ones.
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Body of ingredient create and update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
}

/// One page of `GET /ingredients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPage {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    pub total_elements: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default)]
pub struct IngredientFilter {
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub page: PageRequest,
}

impl IngredientFilter {
    fn path(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        for category in &self.categories {
            pairs.push(("categories", category.clone()));
        }
        self.page.append_to(&mut pairs);
        with_query("/ingredients", &pairs)
    }
}

/// Client for the `/ingredients` endpoints.
#[derive(Clone)]
pub struct IngredientService {
    gateway: Gateway,
}

impl IngredientService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Every ingredient visible to the signed-in user, unpaged.
    pub async fn all(&self) -> ApiResult<Vec<Ingredient>> {
        let response = self.gateway.perform(ApiRequest::get("/ingredients/all")).await?;
        Ok(expect_success("all_ingredients", response)?.json()?)
    }

    pub async fn list(&self, filter: &IngredientFilter) -> ApiResult<IngredientPage> {
        let response = self.gateway.perform(ApiRequest::get(filter.path())).await?;
        Ok(expect_success("list_ingredients", response)?.json()?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Ingredient> {
        let response = self
            .gateway
            .perform(ApiRequest::get(format!("/ingredients/{}", id)))
            .await?;
        Ok(expect_success("get_ingredient", response)?.json()?)
    }

    pub async fn create(&self, input: &IngredientInput) -> ApiResult<Ingredient> {
        let request = ApiRequest::post("/ingredients").json(input)?;
        let response = self.gateway.perform(request).await?;
        let ingredient: Ingredient = expect_success("create_ingredient", response)?.json()?;
        info!(ingredient_id = ingredient.id, "Created ingredient");
        Ok(ingredient)
    }

    pub async fn update(&self, id: i64, input: &IngredientInput) -> ApiResult<Ingredient> {
        let request = ApiRequest::put(format!("/ingredients/{}", id)).json(input)?;
        let response = self.gateway.perform(request).await?;
        Ok(expect_success("update_ingredient", response)?.json()?)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let response = self
            .gateway
            .perform(ApiRequest::delete(format!("/ingredients/{}", id)))
            .await?;
        expect_success("delete_ingredient", response)?;
        info!(ingredient_id = id, "Deleted ingredient");
        Ok(())
    }
}
