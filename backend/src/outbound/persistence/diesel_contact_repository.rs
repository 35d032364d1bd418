//! PostgreSQL-backed [`ContactRepository`].
//!
//! Every statement carries the owner filter, so a foreign contact id behaves
//! exactly like an unknown one.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{ContactRepository, RepositoryError};
use crate::domain::{Contact, ContactSearch, UserId};

use super::diesel_helpers::{
    contains_pattern, map_diesel_error, map_pool_error, page_window, total_items,
};
use super::models::ContactRow;
use super::pool::DbPool;
use super::schema::contacts;

/// Diesel-backed contact storage.
#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    /// Create a repository on `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn owned_matching(user_id: Uuid, filter: &ContactSearch) -> contacts::BoxedQuery<'static, Pg> {
    let mut query = contacts::table
        .filter(contacts::user_id.eq(user_id))
        .into_boxed();
    if let Some(name) = filter.name.as_deref() {
        let pattern = contains_pattern(name);
        query = query.filter(
            contacts::first_name
                .ilike(pattern.clone())
                .or(contacts::last_name.assume_not_null().ilike(pattern)),
        );
    }
    if let Some(email) = filter.email.as_deref() {
        query = query.filter(
            contacts::email
                .assume_not_null()
                .ilike(contains_pattern(email)),
        );
    }
    if let Some(phone) = filter.phone.as_deref() {
        query = query.filter(
            contacts::phone
                .assume_not_null()
                .ilike(contains_pattern(phone)),
        );
    }
    query
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn create(&self, contact: &Contact) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(contacts::table)
            .values(ContactRow::from(contact))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Contact>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ContactRow> = contacts::table
            .filter(contacts::id.eq(id))
            .filter(contacts::user_id.eq(*user_id.as_uuid()))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Contact::from))
    }

    async fn search(
        &self,
        user_id: &UserId,
        filter: &ContactSearch,
        page: PageRequest,
    ) -> Result<Page<Contact>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *user_id.as_uuid();

        let total: i64 = owned_matching(owner, filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<ContactRow> = owned_matching(owner, filter)
            .select(ContactRow::as_select())
            .order((contacts::created_at.desc(), contacts::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            rows.into_iter().map(Contact::from).collect(),
            page,
            total_items(total),
        ))
    }

    async fn update(&self, contact: &Contact) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::update(
            contacts::table
                .filter(contacts::id.eq(contact.id))
                .filter(contacts::user_id.eq(*contact.user_id.as_uuid())),
        )
        .set(ContactRow::from(contact))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::delete(
            contacts::table
                .filter(contacts::id.eq(id))
                .filter(contacts::user_id.eq(*user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }
}
