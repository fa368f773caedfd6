use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, PageRequest, Paginated, RecipeSummary, ResultEngine, Subscription,
    SubscriptionKey, recipes, subscriptions, users,
};

use super::{Engine, with_tx};

impl Engine {
    /// Follow an author.
    ///
    /// Returns the author's profile with their newest recipes, at most
    /// `recipes_limit` of them when given.
    pub async fn subscribe(
        &self,
        key: SubscriptionKey,
        recipes_limit: Option<u64>,
    ) -> ResultEngine<Subscription> {
        if key.user_id == key.author_id {
            return Err(EngineError::InvalidSubscription(
                "cannot subscribe to yourself".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let author = users::Entity::find_by_id(key.author_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {}", key.author_id)))?;

            if subscriptions::Entity::find_by_id((key.user_id, key.author_id))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(format!(
                    "subscription to user {}",
                    key.author_id
                )));
            }

            subscriptions::ActiveModel {
                user_id: ActiveValue::Set(key.user_id),
                author_id: ActiveValue::Set(key.author_id),
            }
            .insert(&db_tx)
            .await?;

            let mut found = self
                .subscriptions_of(&db_tx, key.user_id, vec![author], recipes_limit)
                .await?;
            found
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {}", key.author_id)))
        })
    }

    /// Stop following an author.
    pub async fn unsubscribe(&self, key: SubscriptionKey) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(key.author_id)
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("user {}", key.author_id)));
            }

            let deleted = subscriptions::Entity::delete_by_id((key.user_id, key.author_id))
                .exec(&db_tx)
                .await?;
            if deleted.rows_affected == 0 {
                return Err(EngineError::NotPresent(format!(
                    "subscription to user {}",
                    key.author_id
                )));
            }
            Ok(())
        })
    }

    /// List the authors `user_id` follows, ordered by author id.
    ///
    /// Each entry carries the author's recipes, newest first and truncated to
    /// `recipes_limit` when given; `recipes_count` is the full count.
    pub async fn list_subscriptions(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> ResultEngine<Paginated<Subscription>> {
        let page = page.validate()?;

        with_tx!(self, |db_tx| {
            let query = subscriptions::Entity::find()
                .filter(subscriptions::Column::UserId.eq(user_id));
            let count = query.clone().count(&db_tx).await?;
            let authors: Vec<users::Model> = query
                .order_by_asc(subscriptions::Column::AuthorId)
                .offset(page.offset())
                .limit(page.limit)
                .find_also_related(users::Entity)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|(row, author)| {
                    author.ok_or_else(|| {
                        EngineError::Integrity(format!(
                            "subscription of user {} to missing user {}",
                            row.user_id, row.author_id
                        ))
                    })
                })
                .collect::<ResultEngine<_>>()?;

            let results = self
                .subscriptions_of(&db_tx, user_id, authors, recipes_limit)
                .await?;
            Ok(Paginated { count, results })
        })
    }

    async fn subscriptions_of(
        &self,
        db_tx: &DatabaseTransaction,
        viewer: i32,
        authors: Vec<users::Model>,
        recipes_limit: Option<u64>,
    ) -> ResultEngine<Vec<Subscription>> {
        let profiles = self.user_profiles(db_tx, authors, Some(viewer)).await?;

        let mut out = Vec::with_capacity(profiles.len());
        for author in profiles {
            let query = recipes::Entity::find().filter(recipes::Column::AuthorId.eq(author.id));
            let recipes_count = query.clone().count(db_tx).await?;
            let mut query = query
                .order_by_desc(recipes::Column::PubDate)
                .order_by_desc(recipes::Column::Id);
            if let Some(limit) = recipes_limit {
                query = query.limit(limit);
            }
            let recipes = query
                .all(db_tx)
                .await?
                .into_iter()
                .map(RecipeSummary::from)
                .collect();
            out.push(Subscription {
                author,
                recipes,
                recipes_count,
            });
        }
        Ok(out)
    }
}
