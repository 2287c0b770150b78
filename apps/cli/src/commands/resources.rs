//! Dish, ingredient, cart, grocery list and account commands.

use super::Client;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use pantry_api::{CartEntry, Dish, DishFilter, IngredientFilter, PageRequest};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

fn print_dish(dish: &Dish) {
    output::print_heading(&dish.name);
    output::print_row("ID", &dish.id.to_string());
    output::print_row("Cuisine", dish.cuisine.as_deref().unwrap_or("-"));
    output::print_row("Tags", &dish.tags.join(", "));
    output::print_row("Serves", &dish.people.to_string());
    for item in &dish.ingredients {
        let unit = item.ingredient.unit.as_deref().unwrap_or("");
        output::print_row(&item.ingredient.name, &format!("{} {}", item.quantity, unit));
    }
    if let Some(steps) = dish.cooking_steps.as_deref() {
        println!("\n{}", steps);
    }
}

pub async fn dishes_list(
    client: &Client,
    filter: DishFilter,
    format: OutputFormat,
) -> Result<()> {
    let page = client.api.dishes.list(&filter).await?;
    match format {
        OutputFormat::Text => {
            output::print_heading(&format!(
                "Dishes (page {} of {}, {} total)",
                filter.page.page + 1,
                page.total_pages.max(1),
                page.total_elements
            ));
            for dish in &page.dishes {
                output::print_row(&format!("#{}", dish.id), &dish.name);
            }
        }
        OutputFormat::Json => output::print_json(&page),
    }
    Ok(())
}

pub async fn dish_show(client: &Client, id: i64, format: OutputFormat) -> Result<()> {
    let dish = client.api.dishes.get(id).await?;
    match format {
        OutputFormat::Text => print_dish(&dish),
        OutputFormat::Json => output::print_json(&dish),
    }
    Ok(())
}

pub async fn dish_delete(client: &Client, id: i64, format: OutputFormat) -> Result<()> {
    client.api.dishes.delete(id).await?;
    output::print_success(&format!("Deleted dish {}", id), format);
    Ok(())
}

pub async fn ingredients_list(
    client: &Client,
    filter: IngredientFilter,
    format: OutputFormat,
) -> Result<()> {
    let page = client.api.ingredients.list(&filter).await?;
    match format {
        OutputFormat::Text => {
            output::print_heading(&format!("Ingredients ({} total)", page.total_elements));
            for ingredient in &page.ingredients {
                let kind = ingredient.category.as_deref().unwrap_or("-");
                output::print_row(&format!("#{}", ingredient.id), &format!("{} ({})", ingredient.name, kind));
            }
        }
        OutputFormat::Json => output::print_json(&page),
    }
    Ok(())
}

pub async fn cart_show(client: &Client, format: OutputFormat) -> Result<()> {
    let entries = client.api.cart.entries().await?;
    match format {
        OutputFormat::Text if entries.is_empty() => println!("Cart is empty"),
        OutputFormat::Text => {
            output::print_heading("Cart");
            for entry in &entries {
                output::print_row(
                    &format!("#{}", entry.id),
                    &format!("dish {} on {} for {}", entry.dish_id, entry.day_of_week, entry.people),
                );
            }
        }
        OutputFormat::Json => output::print_json(&entries),
    }
    Ok(())
}

pub async fn cart_add(
    client: &Client,
    dish_id: i64,
    day: &str,
    people: u32,
    format: OutputFormat,
) -> Result<()> {
    let message = client.api.cart.add(&CartEntry::new(dish_id, day, people)).await?;
    output::print_success(non_empty(&message, "Added to cart"), format);
    Ok(())
}

pub async fn cart_remove(client: &Client, id: i32, format: OutputFormat) -> Result<()> {
    let message = client.api.cart.remove(id).await?;
    output::print_success(non_empty(&message, "Removed from cart"), format);
    Ok(())
}

pub async fn cart_clear(client: &Client, format: OutputFormat) -> Result<()> {
    let message = client.api.cart.clear().await?;
    output::print_success(non_empty(&message, "Cart cleared"), format);
    Ok(())
}

/// Monday 00:00:00 through Sunday 23:59:59 of the week starting `start`.
fn week_bounds(start: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let end = start
        .checked_add_days(Days::new(6))
        .context("week end is out of range")?;
    let first_second = NaiveTime::from_hms_opt(0, 0, 0).context("invalid start of day")?;
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).context("invalid end of day")?;
    Ok((start.and_time(first_second), end.and_time(last_second)))
}

pub async fn cart_save(client: &Client, start: NaiveDate, format: OutputFormat) -> Result<()> {
    let (start_of_week, end_of_week) = week_bounds(start)?;
    client.api.grocery_lists.save_cart(start_of_week, end_of_week).await?;
    output::print_success(&format!("Saved grocery list for week of {}", start), format);
    Ok(())
}

pub async fn lists_show(client: &Client, format: OutputFormat) -> Result<()> {
    let lists = client.api.grocery_lists.list().await?;
    match format {
        OutputFormat::Text => {
            output::print_heading("Grocery lists");
            for list in &lists {
                output::print_row(
                    &format!("#{}", list.id),
                    &format!("{} to {}", list.start_of_week.date(), list.end_of_week.date()),
                );
            }
        }
        OutputFormat::Json => output::print_json(&lists),
    }
    Ok(())
}

pub async fn list_items(
    client: &Client,
    id: i64,
    page: PageRequest,
    format: OutputFormat,
) -> Result<()> {
    let items = client.api.grocery_lists.items(id, page).await?;
    match format {
        OutputFormat::Text => {
            output::print_heading(&format!("Grocery list #{}", id));
            for item in &items.ingredients {
                let unit = item.ingredient.unit.as_deref().unwrap_or("");
                output::print_row(&item.ingredient.name, &format!("{} {}", item.quantity, unit));
            }
        }
        OutputFormat::Json => output::print_json(&items),
    }
    Ok(())
}

/// Parse `ID=QTY` pairs.
fn parse_quantities(pairs: &[String]) -> Result<BTreeMap<i64, f64>> {
    pairs
        .iter()
        .map(|pair| {
            let (id, quantity) = pair
                .split_once('=')
                .with_context(|| format!("expected ID=QUANTITY, got {}", pair))?;
            let id = id.trim().parse().with_context(|| format!("bad ingredient id in {}", pair))?;
            let quantity = quantity
                .trim()
                .parse()
                .with_context(|| format!("bad quantity in {}", pair))?;
            Ok((id, quantity))
        })
        .collect()
}

pub async fn list_set(client: &Client, id: i64, pairs: &[String], format: OutputFormat) -> Result<()> {
    let quantities = parse_quantities(pairs)?;
    client.api.grocery_lists.set_quantities(id, &quantities).await?;
    output::print_success(&format!("Updated grocery list {}", id), format);
    Ok(())
}

pub async fn list_delete(client: &Client, id: i64, format: OutputFormat) -> Result<()> {
    client.api.grocery_lists.delete(id).await?;
    output::print_success(&format!("Deleted grocery list {}", id), format);
    Ok(())
}

/// Write the account's data export to `destination`, or to the backend's file
/// name in the current directory.
pub async fn account_export(
    client: &Client,
    destination: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let export = client.api.users.export_data().await?;
    let target = match destination {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(export.file_name.as_deref().unwrap_or("pantry-export.json")),
    };
    std::fs::write(&target, &export.content)
        .with_context(|| format!("could not write {}", target.display()))?;
    debug!(path = %target.display(), bytes = export.content.len(), "Wrote data export");
    output::print_success(&format!("Exported account data to {}", target.display()), format);
    Ok(())
}

pub async fn account_delete(client: &Client, format: OutputFormat) -> Result<()> {
    client.api.users.delete_own_account().await?;
    output::print_success("Account deleted", format);
    Ok(())
}

fn non_empty<'a>(message: &'a str, fallback: &'a str) -> &'a str {
    if message.trim().is_empty() {
        fallback
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_bounds_span_seven_days() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let (from, to) = week_bounds(start).unwrap();
        assert_eq!(from.to_string(), "2026-10-19 00:00:00");
        assert_eq!(to.to_string(), "2026-10-25 23:59:59");
    }

    #[test]
    fn test_parse_quantities() {
        let parsed = parse_quantities(&["3=2.5".to_string(), " 9 = 1".to_string()]).unwrap();
        assert_eq!(parsed, BTreeMap::from([(3, 2.5), (9, 1.0)]));
        assert!(parse_quantities(&["leek".to_string()]).is_err());
        assert!(parse_quantities(&["x=1".to_string()]).is_err());
    }

    #[test]
    fn test_non_empty_falls_back() {
        assert_eq!(non_empty("", "Cart cleared"), "Cart cleared");
        assert_eq!(non_empty("Done", "Cart cleared"), "Done");
    }
}
