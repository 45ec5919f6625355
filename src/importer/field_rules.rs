// ==========================================
// 联系人导入系统 - 字段规则
// ==========================================
// 职责: 五个字段的校验规则（唯一定义处）
// 约束: 纯函数，无副作用；输入为原始文本，不做 TRIM/大小写转换
// ==========================================
// | 字段                      | 规则                                   |
// | first_name / second_name  | ^[A-Za-z0-9]+$ 且长度 <= 20            |
// | email                     | ^[^\s@]+@[^\s@]+\.[^\s@]+$             |
// | phone_number              | ^[0-9]{10}$                            |
// | postal_code               | ^[0-9][A-Za-z0-9]{5}$                  |
// ==========================================

use crate::domain::contact::{ContactField, RuleViolation};
use once_cell::sync::Lazy;
use regex::Regex;

/// 姓名最大长度
pub const NAME_MAX_LEN: usize = 20;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());
static POSTAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9][A-Za-z0-9]{5}$").unwrap());

/// 单字段校验结果
pub type RuleResult = Result<(), RuleViolation>;

/// 名 / 姓
pub fn check_name(value: &str) -> RuleResult {
    if value.is_empty() {
        return Err(RuleViolation::Empty);
    }
    if !NAME_RE.is_match(value) {
        return Err(RuleViolation::NotAlphanumeric);
    }
    // 已限定为 ASCII，字节数即字符数
    if value.len() > NAME_MAX_LEN {
        return Err(RuleViolation::TooLong {
            max: NAME_MAX_LEN,
            actual: value.len(),
        });
    }
    Ok(())
}

pub fn check_email(value: &str) -> RuleResult {
    if value.is_empty() {
        return Err(RuleViolation::Empty);
    }
    if !EMAIL_RE.is_match(value) {
        return Err(RuleViolation::MalformedEmail);
    }
    Ok(())
}

pub fn check_phone_number(value: &str) -> RuleResult {
    if value.is_empty() {
        return Err(RuleViolation::Empty);
    }
    if !PHONE_RE.is_match(value) {
        return Err(RuleViolation::NotTenDigits);
    }
    Ok(())
}

pub fn check_postal_code(value: &str) -> RuleResult {
    if value.is_empty() {
        return Err(RuleViolation::Empty);
    }
    if !POSTAL_RE.is_match(value) {
        return Err(RuleViolation::MalformedPostalCode);
    }
    Ok(())
}

/// 按字段分派到对应规则
pub fn check_field(field: ContactField, value: &str) -> RuleResult {
    match field {
        ContactField::FirstName | ContactField::SecondName => check_name(value),
        ContactField::Email => check_email(value),
        ContactField::PhoneNumber => check_phone_number(value),
        ContactField::PostalCode => check_postal_code(value),
    }
}
