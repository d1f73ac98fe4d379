//! Voucher write payloads.

use crate::domain::{
    users::models::UserUuid,
    vouchers::models::{UserVoucherUuid, VoucherUuid},
};

#[derive(Debug, Clone)]
pub struct NewUserVoucher {
    pub uuid: UserVoucherUuid,
    pub user_uuid: UserUuid,
    pub voucher_uuid: VoucherUuid,
}
