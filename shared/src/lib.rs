//! Types and pure logic shared by the backend and the dashboard.
//!
//! Nothing in this crate performs I/O: it holds the record model, the ledger
//! schemas with their total formulas, attendance arithmetic and the wire DTOs.

use serde::{Deserialize, Serialize};

pub mod attendance;
pub mod record;
pub mod schema;
pub mod weekday;

pub use attendance::*;
pub use record::*;
pub use schema::*;
pub use weekday::*;

/// Body of `POST /api/sample/auth/signin`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
    pub role: String,
    pub message: String,
}

/// Every mutating response and every error carries a localized message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User-facing messages, shared so the server and the dashboard agree on wording.
pub mod messages {
    pub const SIGNIN_SUCCESS: &str = "تم تسجيل الدخول بنجاح";
    pub const SIGNIN_FAILED: &str = "اسم المستخدم أو كلمة المرور غير صحيحة";
    pub const UNAUTHORIZED: &str = "غير مصرح لك بالوصول";
    pub const SESSION_EXPIRED: &str = "انتهت الجلسة، يرجى تسجيل الدخول مرة أخرى";
    pub const RECORD_CREATED: &str = "تمت إضافة السجل بنجاح";
    pub const RECORD_UPDATED: &str = "تم تحديث السجل بنجاح";
    pub const RECORD_DELETED: &str = "تم حذف السجل بنجاح";
    pub const RECORD_NOT_FOUND: &str = "السجل غير موجود";
    pub const UNKNOWN_LEDGER: &str = "الحساب المطلوب غير موجود";
    pub const SERVER_ERROR: &str = "حدث خطأ في الخادم";
    pub const NETWORK_ERROR: &str = "حدث خطأ أثناء الاتصال بالخادم";
    pub const INVALID_INPUT: &str = "يرجى ملء جميع الحقول المطلوبة";
}
