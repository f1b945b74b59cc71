// API 类型定义模块
// 联系表单接口的响应负载

use crate::contact::ContactRecord;
use serde::Serialize;

/// `{"ok": true}`
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

/// `{"ok": false, "error": "<code>"}`
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub ok: bool,
    pub error: &'a str,
}

/// `{"ok": true, "items": [...]}`
#[derive(Debug, Serialize)]
pub struct ContactList<'a> {
    pub ok: bool,
    pub items: &'a [ContactRecord],
}
