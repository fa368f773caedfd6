use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, IngredientAmount, PageRequest, Paginated, Recipe, RecipeDraft, RecipeFilter,
    RecipeIngredient, RecipeList, ResultEngine, Tag, UserProfile, favorites, ingredients,
    recipe_ingredients, recipe_tags, recipes, shopping_list_entries, tags, users,
    util::{ValidDraft, validate_draft},
};

use super::{Engine, with_tx};

impl Engine {
    /// Publish a new recipe authored by `author_id`.
    pub async fn create_recipe(&self, author_id: i32, draft: RecipeDraft) -> ResultEngine<Recipe> {
        let draft = validate_draft(&draft)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(author_id)
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("user {author_id}")));
            }
            Self::check_references(&db_tx, &draft).await?;

            let model = recipes::ActiveModel {
                id: ActiveValue::NotSet,
                author_id: ActiveValue::Set(author_id),
                name: ActiveValue::Set(draft.name.clone()),
                text: ActiveValue::Set(draft.text.clone()),
                image: ActiveValue::Set(draft.image.clone()),
                cooking_time: ActiveValue::Set(draft.cooking_time),
                pub_date: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Self::insert_links(&db_tx, model.id, &draft).await?;

            let recipe_id = model.id;
            self.hydrate_recipes(&db_tx, vec![model], Some(author_id))
                .await?
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {recipe_id}")))
        })
    }

    /// Replace every field of a recipe, its tags and its ingredient lines.
    ///
    /// Only the author may do it. The publication date is kept.
    pub async fn update_recipe(
        &self,
        recipe_id: i32,
        draft: RecipeDraft,
        user_id: i32,
    ) -> ResultEngine<Recipe> {
        let draft = validate_draft(&draft)?;

        with_tx!(self, |db_tx| {
            let model = Self::owned_recipe(&db_tx, recipe_id, user_id).await?;
            Self::check_references(&db_tx, &draft).await?;

            let mut active: recipes::ActiveModel = model.into();
            active.name = ActiveValue::Set(draft.name.clone());
            active.text = ActiveValue::Set(draft.text.clone());
            active.image = ActiveValue::Set(draft.image.clone());
            active.cooking_time = ActiveValue::Set(draft.cooking_time);
            let model = active.update(&db_tx).await?;

            recipe_tags::Entity::delete_many()
                .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
                .exec(&db_tx)
                .await?;
            recipe_ingredients::Entity::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
                .exec(&db_tx)
                .await?;
            Self::insert_links(&db_tx, recipe_id, &draft).await?;

            self.hydrate_recipes(&db_tx, vec![model], Some(user_id))
                .await?
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {recipe_id}")))
        })
    }

    /// Delete a recipe together with its lines, tags and every favorite or
    /// shopping list entry pointing at it. Only the author may do it.
    pub async fn delete_recipe(&self, recipe_id: i32, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = Self::owned_recipe(&db_tx, recipe_id, user_id).await?;

            recipe_tags::Entity::delete_many()
                .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
                .exec(&db_tx)
                .await?;
            recipe_ingredients::Entity::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
                .exec(&db_tx)
                .await?;
            favorites::Entity::delete_many()
                .filter(favorites::Column::RecipeId.eq(recipe_id))
                .exec(&db_tx)
                .await?;
            shopping_list_entries::Entity::delete_many()
                .filter(shopping_list_entries::Column::RecipeId.eq(recipe_id))
                .exec(&db_tx)
                .await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// Return one recipe as seen by `viewer`.
    pub async fn recipe(&self, recipe_id: i32, viewer: Option<i32>) -> ResultEngine<Recipe> {
        with_tx!(self, |db_tx| {
            let model = recipes::Entity::find_by_id(recipe_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {recipe_id}")))?;
            self.hydrate_recipes(&db_tx, vec![model], viewer)
                .await?
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {recipe_id}")))
        })
    }

    /// List recipes, newest first.
    ///
    /// Tag slugs match any-of. The favorite and shopping cart filters need a
    /// viewer and are ignored for anonymous callers.
    pub async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
        viewer: Option<i32>,
    ) -> ResultEngine<Paginated<Recipe>> {
        let page = page.validate()?;

        with_tx!(self, |db_tx| {
            let mut query = recipes::Entity::find();
            if let Some(author_id) = filter.author_id {
                query = query.filter(recipes::Column::AuthorId.eq(author_id));
            }
            if !filter.tags.is_empty() {
                let tag_ids: Vec<i32> = tags::Entity::find()
                    .filter(tags::Column::Slug.is_in(filter.tags.iter().cloned()))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|tag| tag.id)
                    .collect();
                let recipe_ids: BTreeSet<i32> = recipe_tags::Entity::find()
                    .filter(recipe_tags::Column::TagId.is_in(tag_ids))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|link| link.recipe_id)
                    .collect();
                query = query.filter(recipes::Column::Id.is_in(recipe_ids));
            }
            if let Some(viewer_id) = viewer {
                let flags = [
                    (RecipeList::Favorites, filter.is_favorited),
                    (RecipeList::ShoppingList, filter.is_in_shopping_cart),
                ];
                for (list, wanted) in flags {
                    let Some(wanted) = wanted else { continue };
                    let ids = Self::recipe_ids_in_list(&db_tx, list, viewer_id).await?;
                    query = if wanted {
                        query.filter(recipes::Column::Id.is_in(ids))
                    } else {
                        query.filter(recipes::Column::Id.is_not_in(ids))
                    };
                }
            }

            let count = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_desc(recipes::Column::PubDate)
                .order_by_desc(recipes::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            let results = self.hydrate_recipes(&db_tx, models, viewer).await?;
            Ok(Paginated { count, results })
        })
    }

    /// Load a recipe and check that `user_id` wrote it.
    async fn owned_recipe(
        db_tx: &DatabaseTransaction,
        recipe_id: i32,
        user_id: i32,
    ) -> ResultEngine<recipes::Model> {
        let model = recipes::Entity::find_by_id(recipe_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {recipe_id}")))?;
        if model.author_id != user_id {
            return Err(EngineError::Forbidden(format!(
                "recipe {recipe_id} belongs to another user"
            )));
        }
        Ok(model)
    }

    /// Every tag and ingredient named by the draft must exist.
    async fn check_references(db_tx: &DatabaseTransaction, draft: &ValidDraft) -> ResultEngine<()> {
        let known_tags: HashSet<i32> = tags::Entity::find()
            .filter(tags::Column::Id.is_in(draft.tags.clone()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|tag| tag.id)
            .collect();
        if let Some(missing) = draft.tags.iter().find(|id| !known_tags.contains(*id)) {
            return Err(EngineError::KeyNotFound(format!("tag {missing}")));
        }

        let known_ingredients: HashSet<i32> = ingredients::Entity::find()
            .filter(
                ingredients::Column::Id
                    .is_in(draft.ingredients.iter().map(|line| line.ingredient_id)),
            )
            .all(db_tx)
            .await?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect();
        if let Some(missing) = draft
            .ingredients
            .iter()
            .find(|line| !known_ingredients.contains(&line.ingredient_id))
        {
            return Err(EngineError::KeyNotFound(format!(
                "ingredient {}",
                missing.ingredient_id
            )));
        }
        Ok(())
    }

    async fn insert_links(
        db_tx: &DatabaseTransaction,
        recipe_id: i32,
        draft: &ValidDraft,
    ) -> ResultEngine<()> {
        recipe_tags::Entity::insert_many(draft.tags.iter().map(|&tag_id| {
            recipe_tags::ActiveModel {
                recipe_id: ActiveValue::Set(recipe_id),
                tag_id: ActiveValue::Set(tag_id),
            }
        }))
        .exec(db_tx)
        .await?;

        recipe_ingredients::Entity::insert_many(draft.ingredients.iter().map(
            |&IngredientAmount {
                 ingredient_id,
                 amount,
             }| recipe_ingredients::ActiveModel {
                id: ActiveValue::NotSet,
                recipe_id: ActiveValue::Set(recipe_id),
                ingredient_id: ActiveValue::Set(ingredient_id),
                amount: ActiveValue::Set(amount),
            },
        ))
        .exec(db_tx)
        .await?;
        Ok(())
    }

    /// Turn recipe rows into full [`Recipe`] views, keeping their order.
    async fn hydrate_recipes(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<recipes::Model>,
        viewer: Option<i32>,
    ) -> ResultEngine<Vec<Recipe>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let recipe_ids: Vec<i32> = models.iter().map(|model| model.id).collect();

        let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
        for (link, tag) in recipe_tags::Entity::find()
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.clone()))
            .find_also_related(tags::Entity)
            .all(db_tx)
            .await?
        {
            let tag = tag.ok_or_else(|| {
                EngineError::Integrity(format!(
                    "recipe {} links to missing tag {}",
                    link.recipe_id, link.tag_id
                ))
            })?;
            tags_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(Tag::from(tag));
        }
        for list in tags_by_recipe.values_mut() {
            list.sort_by(|a, b| a.slug.cmp(&b.slug));
        }

        let mut lines_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
        for (line, ingredient) in recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.clone()))
            .order_by_asc(recipe_ingredients::Column::Id)
            .find_also_related(ingredients::Entity)
            .all(db_tx)
            .await?
        {
            let ingredient = ingredient.ok_or_else(|| {
                EngineError::Integrity(format!(
                    "recipe {} uses missing ingredient {}",
                    line.recipe_id, line.ingredient_id
                ))
            })?;
            lines_by_recipe
                .entry(line.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: line.amount,
                });
        }

        let author_ids: BTreeSet<i32> = models.iter().map(|model| model.author_id).collect();
        let author_models = users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids))
            .all(db_tx)
            .await?;
        let authors: HashMap<i32, UserProfile> = self
            .user_profiles(db_tx, author_models, viewer)
            .await?
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();

        let (favorited, in_cart) = match viewer {
            Some(viewer_id) => (
                Self::recipe_ids_in_list(db_tx, RecipeList::Favorites, viewer_id).await?,
                Self::recipe_ids_in_list(db_tx, RecipeList::ShoppingList, viewer_id).await?,
            ),
            None => (BTreeSet::new(), BTreeSet::new()),
        };

        models
            .into_iter()
            .map(|model| -> ResultEngine<Recipe> {
                let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
                    EngineError::Integrity(format!(
                        "recipe {} has missing author {}",
                        model.id, model.author_id
                    ))
                })?;
                Ok(Recipe {
                    id: model.id,
                    tags: tags_by_recipe.remove(&model.id).unwrap_or_default(),
                    ingredients: lines_by_recipe.remove(&model.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&model.id),
                    is_in_shopping_cart: in_cart.contains(&model.id),
                    name: model.name,
                    text: model.text,
                    image: model.image,
                    cooking_time: model.cooking_time,
                    pub_date: model.pub_date,
                    author,
                })
            })
            .collect()
    }
}
