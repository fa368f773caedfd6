//! Favorites and shopping list membership.
//!
//! Both lists share the same rules, so they share one code path keyed by
//! [`RecipeList`]: the recipe must exist, adding twice is an error and so is
//! removing an entry that is not there.

use std::collections::BTreeSet;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, MembershipKey, RecipeList, RecipeSummary, ResultEngine, favorites, recipes,
    shopping_list_entries,
};

use super::{Engine, with_tx};

impl Engine {
    /// Put a recipe in one of the user's lists.
    pub async fn add_to_recipe_list(
        &self,
        list: RecipeList,
        key: MembershipKey,
    ) -> ResultEngine<RecipeSummary> {
        with_tx!(self, |db_tx| {
            let recipe = recipes::Entity::find_by_id(key.recipe_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {}", key.recipe_id)))?;

            if Self::list_contains(&db_tx, list, key).await? {
                return Err(EngineError::ExistingKey(format!(
                    "recipe {} in {}",
                    key.recipe_id,
                    list.as_str()
                )));
            }

            match list {
                RecipeList::Favorites => {
                    favorites::ActiveModel {
                        user_id: ActiveValue::Set(key.user_id),
                        recipe_id: ActiveValue::Set(key.recipe_id),
                    }
                    .insert(&db_tx)
                    .await?;
                }
                RecipeList::ShoppingList => {
                    shopping_list_entries::ActiveModel {
                        user_id: ActiveValue::Set(key.user_id),
                        recipe_id: ActiveValue::Set(key.recipe_id),
                    }
                    .insert(&db_tx)
                    .await?;
                }
            }

            Ok(RecipeSummary::from(recipe))
        })
    }

    /// Take a recipe out of one of the user's lists.
    pub async fn remove_from_recipe_list(
        &self,
        list: RecipeList,
        key: MembershipKey,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if recipes::Entity::find_by_id(key.recipe_id)
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("recipe {}", key.recipe_id)));
            }

            let deleted = match list {
                RecipeList::Favorites => {
                    favorites::Entity::delete_by_id((key.user_id, key.recipe_id))
                        .exec(&db_tx)
                        .await?
                }
                RecipeList::ShoppingList => {
                    shopping_list_entries::Entity::delete_by_id((key.user_id, key.recipe_id))
                        .exec(&db_tx)
                        .await?
                }
            };
            if deleted.rows_affected == 0 {
                return Err(EngineError::NotPresent(format!(
                    "recipe {} in {}",
                    key.recipe_id,
                    list.as_str()
                )));
            }
            Ok(())
        })
    }

    async fn list_contains(
        db_tx: &DatabaseTransaction,
        list: RecipeList,
        key: MembershipKey,
    ) -> ResultEngine<bool> {
        let found = match list {
            RecipeList::Favorites => favorites::Entity::find_by_id((key.user_id, key.recipe_id))
                .one(db_tx)
                .await?
                .is_some(),
            RecipeList::ShoppingList => {
                shopping_list_entries::Entity::find_by_id((key.user_id, key.recipe_id))
                    .one(db_tx)
                    .await?
                    .is_some()
            }
        };
        Ok(found)
    }

    /// Ids of the recipes `user_id` has in `list`, deduplicated.
    pub(super) async fn recipe_ids_in_list(
        db_tx: &DatabaseTransaction,
        list: RecipeList,
        user_id: i32,
    ) -> ResultEngine<BTreeSet<i32>> {
        let ids: BTreeSet<i32> = match list {
            RecipeList::Favorites => favorites::Entity::find()
                .filter(favorites::Column::UserId.eq(user_id))
                .all(db_tx)
                .await?
                .into_iter()
                .map(|row| row.recipe_id)
                .collect(),
            RecipeList::ShoppingList => shopping_list_entries::Entity::find()
                .filter(shopping_list_entries::Column::UserId.eq(user_id))
                .all(db_tx)
                .await?
                .into_iter()
                .map(|row| row.recipe_id)
                .collect(),
        };
        Ok(ids)
    }
}
