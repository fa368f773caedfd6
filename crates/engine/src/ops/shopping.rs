use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, IngredientLine, RecipeList, ResultEngine, ShoppingReport, ingredients,
    recipe_ingredients, recipes,
};

use super::{Engine, with_tx};

impl Engine {
    /// Build the aggregated shopping list of `user_id`.
    ///
    /// Entries, recipes and ingredient lines are read in one transaction so
    /// the report reflects a single snapshot. A queued recipe or a line
    /// ingredient that cannot be found is reported as
    /// [`EngineError::Integrity`] rather than skipped.
    pub async fn shopping_report(&self, user_id: i32) -> ResultEngine<ShoppingReport> {
        with_tx!(self, |db_tx| {
            let recipe_ids =
                Self::recipe_ids_in_list(&db_tx, RecipeList::ShoppingList, user_id).await?;
            if recipe_ids.is_empty() {
                return Ok(ShoppingReport::default());
            }

            let found = recipes::Entity::find()
                .filter(recipes::Column::Id.is_in(recipe_ids.iter().copied()))
                .count(&db_tx)
                .await?;
            if found != recipe_ids.len() as u64 {
                return Err(EngineError::Integrity(format!(
                    "shopping list of user {user_id} references {} missing recipe(s)",
                    recipe_ids.len() as u64 - found.min(recipe_ids.len() as u64)
                )));
            }

            let rows = recipe_ingredients::Entity::find()
                .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids))
                .order_by_asc(recipe_ingredients::Column::Id)
                .find_also_related(ingredients::Entity)
                .all(&db_tx)
                .await?;

            let mut lines = Vec::with_capacity(rows.len());
            for (line, ingredient) in rows {
                let ingredient = ingredient.ok_or_else(|| {
                    EngineError::Integrity(format!(
                        "recipe {} uses missing ingredient {}",
                        line.recipe_id, line.ingredient_id
                    ))
                })?;
                lines.push(IngredientLine {
                    recipe_id: line.recipe_id,
                    ingredient_id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: line.amount,
                });
            }

            Ok(ShoppingReport::aggregate(lines))
        })
    }
}
