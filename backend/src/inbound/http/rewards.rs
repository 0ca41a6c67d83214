//! Reward API handlers.
//!
//! ```text
//! GET /get-user-score/alice -> {"score":30,"couponImage":"https://.../basic.png"}
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::RewardStatus;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_username};

/// Score and coupon outcome for a user.
///
/// Exactly one of `couponImage` and `message` is present, except when the
/// score reaches no category: then `couponImage` is `null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardStatusResponse {
    #[schema(example = 30)]
    pub score: i64,
    #[serde(default, skip_serializing_if = "CouponImage::is_omitted")]
    #[schema(value_type = Option<String>)]
    pub coupon_image: CouponImage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Coupon already redeemed for this score.")]
    pub message: Option<String>,
}

/// `couponImage` distinguishes an explicit `null` from an absent key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CouponImage(Option<Option<String>>);

impl CouponImage {
    fn is_omitted(&self) -> bool {
        self.0.is_none()
    }
}

impl From<RewardStatus> for RewardStatusResponse {
    fn from(status: RewardStatus) -> Self {
        let score = status.score();
        let message = status.message().map(str::to_owned);
        let coupon_image = match status {
            RewardStatus::Coupon { coupon_image, .. } => CouponImage(Some(Some(coupon_image))),
            RewardStatus::NoCategory { .. } => CouponImage(Some(None)),
            RewardStatus::AlreadyRedeemed { .. } | RewardStatus::PoolEmpty { .. } => {
                CouponImage(None)
            }
        };
        Self {
            score,
            coupon_image,
            message,
        }
    }
}

/// Report a user's score, issuing a coupon when one is due.
///
/// A coupon is issued at most once per score; asking again reports that it
/// was already redeemed.
#[utoipa::path(
    get,
    path = "/get-user-score/{username}",
    params(("username" = String, Path, description = "User whose score to read")),
    responses(
        (status = 200, description = "Reward status", body = RewardStatusResponse),
        (status = 400, description = "Invalid username", body = ErrorSchema),
        (status = 404, description = "No reward record", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "getUserScore",
    security([])
)]
#[get("/get-user-score/{username}")]
pub async fn user_score(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RewardStatusResponse>> {
    let username = parse_username(&path, FieldName::new("username"))?;
    let status = state.rewards.reward_status(&username).await?;
    Ok(web::Json(status.into()))
}
