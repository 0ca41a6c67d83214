//! PostgreSQL-backed `CouponCatalogue`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CouponCatalogue, CouponCatalogueError};
use crate::domain::{Coupon, CouponCategory};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::CouponRow;
use super::pool::DbPool;
use super::schema::coupons;

/// Diesel-backed implementation of the coupon catalogue port.
#[derive(Clone)]
pub struct DieselCouponCatalogue {
    pool: DbPool,
}

impl DieselCouponCatalogue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponCatalogue for DieselCouponCatalogue {
    async fn coupons_for(
        &self,
        category: CouponCategory,
    ) -> Result<Vec<Coupon>, CouponCatalogueError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, CouponCatalogueError::connection))?;
        let rows = coupons::table
            .filter(coupons::category.eq(category.as_str()))
            .select(CouponRow::as_select())
            .load::<CouponRow>(&mut conn)
            .await
            .map_err(|err| {
                map_basic_diesel_error(
                    err,
                    CouponCatalogueError::query,
                    CouponCatalogueError::connection,
                )
            })?;

        Ok(rows
            .into_iter()
            .map(|row| Coupon {
                category,
                image_url: row.image_url,
            })
            .collect())
    }
}
