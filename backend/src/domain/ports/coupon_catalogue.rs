//! Port for the coupon catalogue.

use async_trait::async_trait;

use crate::domain::{Coupon, CouponCategory};

use super::define_port_error;

define_port_error! {
    /// Errors raised by coupon catalogue adapters.
    pub enum CouponCatalogueError {
        /// Catalogue connection could not be established.
        Connection { message: String } =>
            "coupon catalogue connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "coupon catalogue query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponCatalogue: Send + Sync {
    /// Coupons available for `category`.
    async fn coupons_for(
        &self,
        category: CouponCategory,
    ) -> Result<Vec<Coupon>, CouponCatalogueError>;
}
