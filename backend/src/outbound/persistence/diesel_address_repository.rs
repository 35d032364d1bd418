//! PostgreSQL-backed [`AddressRepository`].
//!
//! Statements are scoped by `contact_id`; the service has already confirmed
//! that the contact belongs to the caller.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::Address;
use crate::domain::ports::{AddressRepository, RepositoryError};

use super::diesel_helpers::{map_diesel_error, map_pool_error, page_window, total_items};
use super::models::AddressRow;
use super::pool::DbPool;
use super::schema::addresses;

/// Diesel-backed address storage.
#[derive(Clone)]
pub struct DieselAddressRepository {
    pool: DbPool,
}

impl DieselAddressRepository {
    /// Create a repository on `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepository for DieselAddressRepository {
    async fn create(&self, address: &Address) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(addresses::table)
            .values(AddressRow::from(address))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, contact_id: Uuid, id: Uuid) -> Result<Option<Address>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AddressRow> = addresses::table
            .filter(addresses::id.eq(id))
            .filter(addresses::contact_id.eq(contact_id))
            .select(AddressRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Address::from))
    }

    async fn list(
        &self,
        contact_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Address>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = addresses::table
            .filter(addresses::contact_id.eq(contact_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<AddressRow> = addresses::table
            .filter(addresses::contact_id.eq(contact_id))
            .select(AddressRow::as_select())
            .order((addresses::created_at.desc(), addresses::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            rows.into_iter().map(Address::from).collect(),
            page,
            total_items(total),
        ))
    }

    async fn update(&self, address: &Address) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::update(
            addresses::table
                .filter(addresses::id.eq(address.id))
                .filter(addresses::contact_id.eq(address.contact_id)),
        )
        .set(AddressRow::from(address))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }

    async fn delete(&self, contact_id: Uuid, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::delete(
            addresses::table
                .filter(addresses::id.eq(id))
                .filter(addresses::contact_id.eq(contact_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }
}
