use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, NewUser, PageRequest, Paginated, ResultEngine, User, UserProfile, subscriptions,
    users,
    util::{MAX_NAME_LEN, normalize_email, normalize_required_name, normalize_username},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new account.
    ///
    /// Username and email must be unique; the password is stored as a bcrypt
    /// hash.
    pub async fn register_user(&self, new_user: NewUser) -> ResultEngine<User> {
        let username = normalize_username(&new_user.username)?;
        let email = normalize_email(&new_user.email)?;
        let first_name = normalize_required_name(&new_user.first_name, "first name", MAX_NAME_LEN)?;
        let last_name = normalize_required_name(&new_user.last_name, "last name", MAX_NAME_LEN)?;
        if new_user.password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }
        let password = bcrypt::hash(&new_user.password, self.password_cost)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find()
                .filter(users::Column::Username.eq(username.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            if users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username),
                email: ActiveValue::Set(email),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                password: ActiveValue::Set(password),
                role: ActiveValue::Set(new_user.role.as_str().to_string()),
                date_joined: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            User::try_from(model)
        })
    }

    /// Check a username/password pair and return the matching account.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
            .ok_or(EngineError::InvalidCredentials)?;

        if !bcrypt::verify(password, &model.password)? {
            return Err(EngineError::InvalidCredentials);
        }

        User::try_from(model)
    }

    /// Return the account of `user_id`.
    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))?;
        User::try_from(model)
    }

    /// Return the public profile of `user_id` as seen by `viewer`.
    pub async fn user_profile(&self, user_id: i32, viewer: Option<i32>) -> ResultEngine<UserProfile> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))?;
            let mut profiles = self.user_profiles(&db_tx, vec![model], viewer).await?;
            profiles
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
        })
    }

    /// List every account, ordered by id.
    pub async fn list_users(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> ResultEngine<Paginated<UserProfile>> {
        let page = page.validate()?;
        with_tx!(self, |db_tx| {
            let query = users::Entity::find();
            let count = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_asc(users::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?;
            let results = self.user_profiles(&db_tx, models, viewer).await?;
            Ok(Paginated { count, results })
        })
    }

    /// Replace the password of `user_id` after checking the current one.
    pub async fn set_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> ResultEngine<()> {
        if new_password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))?;
            if !bcrypt::verify(current_password, &model.password)? {
                return Err(EngineError::InvalidCredentials);
            }

            let mut active: users::ActiveModel = model.into();
            active.password = ActiveValue::Set(bcrypt::hash(new_password, self.password_cost)?);
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Map user rows to profiles, resolving `is_subscribed` for `viewer`.
    pub(super) async fn user_profiles(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<users::Model>,
        viewer: Option<i32>,
    ) -> ResultEngine<Vec<UserProfile>> {
        let followed: HashSet<i32> = match viewer {
            Some(viewer_id) if !models.is_empty() => subscriptions::Entity::find()
                .filter(subscriptions::Column::UserId.eq(viewer_id))
                .filter(subscriptions::Column::AuthorId.is_in(models.iter().map(|m| m.id)))
                .all(db_tx)
                .await?
                .into_iter()
                .map(|row| row.author_id)
                .collect(),
            _ => HashSet::new(),
        };

        Ok(models
            .into_iter()
            .map(|model| {
                let is_subscribed = followed.contains(&model.id);
                UserProfile::from_model(model, is_subscribed)
            })
            .collect())
    }
}
