//! Voucher Models

use folio::prices::Price;
use jiff::Timestamp;

use crate::{domain::users::models::UserUuid, uuids::TypedUuid};

/// Voucher UUID
pub type VoucherUuid = TypedUuid<Voucher>;

/// User Voucher UUID
pub type UserVoucherUuid = TypedUuid<UserVoucher>;

/// Voucher Model
///
/// `percentage` is the discount percent; `upper_limit` caps the
/// discounted amount. `all_user` vouchers may be claimed without an
/// explicit assignment.
#[derive(Debug, Clone)]
pub struct Voucher {
    pub uuid: VoucherUuid,
    pub code: String,
    pub percentage: u32,
    pub upper_limit: Price,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub all_user: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// UserVoucher Model
#[derive(Debug, Clone)]
pub struct UserVoucher {
    pub uuid: UserVoucherUuid,
    pub user_uuid: UserUuid,
    pub voucher_uuid: VoucherUuid,
    pub usage_count: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
