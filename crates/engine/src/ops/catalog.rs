//! Tag and ingredient catalogs.

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    EngineError, Ingredient, ResultEngine, Tag, ingredients, tags,
    util::{
        MAX_NAME_LEN, MAX_UNIT_LEN, normalize_required_name, normalize_search_key, validate_color,
        validate_slug,
    },
};

use super::{Engine, with_tx};

impl Engine {
    /// List every tag, ordered by slug.
    pub async fn list_tags(&self) -> ResultEngine<Vec<Tag>> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Slug)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Tag::from).collect())
    }

    pub async fn tag(&self, tag_id: i32) -> ResultEngine<Tag> {
        tags::Entity::find_by_id(tag_id)
            .one(&self.database)
            .await?
            .map(Tag::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("tag {tag_id}")))
    }

    /// Add a tag. Name, color and slug must each be unique.
    pub async fn create_tag(&self, name: &str, color: &str, slug: &str) -> ResultEngine<Tag> {
        let name = normalize_required_name(name, "tag name", MAX_NAME_LEN)?;
        let color = validate_color(color)?;
        let slug = validate_slug(slug)?;

        with_tx!(self, |db_tx| {
            let clash = tags::Entity::find()
                .filter(
                    Condition::any()
                        .add(tags::Column::Name.eq(name.clone()))
                        .add(tags::Column::Color.eq(color.clone()))
                        .add(tags::Column::Slug.eq(slug.clone())),
                )
                .one(&db_tx)
                .await?;
            if let Some(existing) = clash {
                let key = if existing.name == name {
                    name
                } else if existing.color == color {
                    color
                } else {
                    slug
                };
                return Err(EngineError::ExistingKey(key));
            }

            let model = tags::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                color: ActiveValue::Set(color),
                slug: ActiveValue::Set(slug),
            }
            .insert(&db_tx)
            .await?;
            Ok(Tag::from(model))
        })
    }

    /// List ingredients in catalog order.
    ///
    /// With `name_prefix`, only ingredients whose name starts with it are
    /// returned; the match ignores case and accents.
    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> ResultEngine<Vec<Ingredient>> {
        let mut query = ingredients::Entity::find();
        if let Some(prefix) = name_prefix.map(normalize_search_key)
            && !prefix.is_empty()
        {
            query = query.filter(ingredients::Column::NameNorm.starts_with(prefix.as_str()));
        }
        let models = query
            .order_by_asc(ingredients::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Ingredient::from).collect())
    }

    pub async fn ingredient(&self, ingredient_id: i32) -> ResultEngine<Ingredient> {
        ingredients::Entity::find_by_id(ingredient_id)
            .one(&self.database)
            .await?
            .map(Ingredient::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("ingredient {ingredient_id}")))
    }

    /// Add one ingredient to the catalog.
    ///
    /// The same name may appear with different units; the exact
    /// `(name, unit)` pair may not.
    pub async fn create_ingredient(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> ResultEngine<Ingredient> {
        let name = normalize_required_name(name, "ingredient name", MAX_NAME_LEN)?;
        let unit = normalize_required_name(measurement_unit, "measurement unit", MAX_UNIT_LEN)?;

        with_tx!(self, |db_tx| {
            if Self::find_ingredient(&db_tx, &name, &unit).await?.is_some() {
                return Err(EngineError::ExistingKey(format!("{name} ({unit})")));
            }
            let model = Self::insert_ingredient(&db_tx, name, unit).await?;
            Ok(Ingredient::from(model))
        })
    }

    /// Bulk-load catalog rows of `(name, measurement_unit)`.
    ///
    /// Rows already present are skipped, so the import can be re-run. Returns
    /// the number of inserted ingredients. Any invalid row aborts the whole
    /// import.
    pub async fn import_ingredients<I>(&self, rows: I) -> ResultEngine<usize>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let rows = rows
            .into_iter()
            .map(|(name, unit)| {
                Ok((
                    normalize_required_name(&name, "ingredient name", MAX_NAME_LEN)?,
                    normalize_required_name(&unit, "measurement unit", MAX_UNIT_LEN)?,
                ))
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        with_tx!(self, |db_tx| {
            let mut inserted = 0;
            for (name, unit) in rows {
                if Self::find_ingredient(&db_tx, &name, &unit).await?.is_some() {
                    continue;
                }
                Self::insert_ingredient(&db_tx, name, unit).await?;
                inserted += 1;
            }
            Ok(inserted)
        })
    }

    async fn find_ingredient(
        db_tx: &DatabaseTransaction,
        name: &str,
        unit: &str,
    ) -> ResultEngine<Option<ingredients::Model>> {
        ingredients::Entity::find()
            .filter(ingredients::Column::Name.eq(name))
            .filter(ingredients::Column::MeasurementUnit.eq(unit))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    async fn insert_ingredient(
        db_tx: &DatabaseTransaction,
        name: String,
        unit: String,
    ) -> ResultEngine<ingredients::Model> {
        let model = ingredients::ActiveModel {
            id: ActiveValue::NotSet,
            name_norm: ActiveValue::Set(normalize_search_key(&name)),
            name: ActiveValue::Set(name),
            measurement_unit: ActiveValue::Set(unit),
        }
        .insert(db_tx)
        .await?;
        Ok(model)
    }
}
