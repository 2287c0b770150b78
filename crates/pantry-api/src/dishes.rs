//! Dishes: `/dishes`.

use crate::call::{expect_success, with_query, PageRequest};
use crate::error::{ApiError, ApiResult};
use crate::ingredients::Ingredient;
use serde::{Deserialize, Serialize};
use session_gateway::{ApiRequest, Gateway};
use tracing::info;

const MAX_PEOPLE: u32 = 100;

/// A dish with its ingredient amounts for `people` servings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Backend tag names such as `DINNER` or `VEGETARIAN`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Cuisine, e.g. `ITALIAN`.
    #[serde(rename = "type", default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub cooking_steps: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub people: u32,
    #[serde(default)]
    pub ingredients: Vec<DishIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishIngredient {
    pub ingredient: Ingredient,
    pub quantity: f64,
}

/// Body of dish create and update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishInput {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub cuisine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_steps: Option<String>,
    pub image_url: String,
    pub people: u32,
    pub ingredients: Vec<DishIngredientInput>,
}

impl DishInput {
    /// Checks the backend would reject anyway, done before any request.
    fn validate(&self) -> ApiResult<()> {
        if self.ingredients.is_empty() {
            return Err(ApiError::InvalidInput("At least one ingredient is required".into()));
        }
        if !(1..=MAX_PEOPLE).contains(&self.people) {
            return Err(ApiError::InvalidInput(format!(
                "People must be between 1 and {}",
                MAX_PEOPLE
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishIngredientInput {
    pub ingredient_id: i64,
    pub quantity: f64,
}

/// One page of `GET /dishes/filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishPage {
    #[serde(default)]
    pub dishes: Vec<Dish>,
    pub total_elements: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DishFilter {
    pub search: Option<String>,
    /// Cuisine names; a dish matches any of them.
    pub countries: Vec<String>,
    pub page: PageRequest,
}

impl DishFilter {
    fn path(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        for country in &self.countries {
            pairs.push(("countries", country.clone()));
        }
        self.page.append_to(&mut pairs);
        with_query("/dishes/filter", &pairs)
    }
}

/// Client for the `/dishes` endpoints.
#[derive(Clone)]
pub struct DishService {
    gateway: Gateway,
}

impl DishService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, filter: &DishFilter) -> ApiResult<DishPage> {
        let response = self.gateway.perform(ApiRequest::get(filter.path())).await?;
        Ok(expect_success("list_dishes", response)?.json()?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Dish> {
        let response = self
            .gateway
            .perform(ApiRequest::get(format!("/dishes/{}", id)))
            .await?;
        Ok(expect_success("get_dish", response)?.json()?)
    }

    pub async fn create(&self, input: &DishInput) -> ApiResult<Dish> {
        input.validate()?;
        let request = ApiRequest::post("/dishes").json(input)?;
        let response = self.gateway.perform(request).await?;
        let dish: Dish = expect_success("create_dish", response)?.json()?;
        info!(dish_id = dish.id, "Created dish");
        Ok(dish)
    }

    pub async fn update(&self, id: i64, input: &DishInput) -> ApiResult<Dish> {
        input.validate()?;
        let request = ApiRequest::put(format!("/dishes/{}", id)).json(input)?;
        let response = self.gateway.perform(request).await?;
        Ok(expect_success("update_dish", response)?.json()?)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let response = self
            .gateway
            .perform(ApiRequest::delete(format!("/dishes/{}", id)))
            .await?;
        expect_success("delete_dish", response)?;
        info!(dish_id = id, "Deleted dish");
        Ok(())
    }
}
