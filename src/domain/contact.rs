// ==========================================
// 联系人导入系统 - 联系人领域模型
// ==========================================
// 职责: 联系人记录、字段枚举、字段违规描述
// 红线: 字段值保持原样，不做大小写转换、不做 TRIM
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 原始记录：字段名 → 原始文本
///
/// 批量文件的一行、或表单提交的一次请求，均以此形式进入校验层
pub type RawRecord = HashMap<String, String>;

// ==========================================
// ContactField - 联系人字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FirstName,
    SecondName,
    Email,
    PhoneNumber,
    PostalCode,
}

impl ContactField {
    /// 全部字段（校验与报告均按此顺序）
    pub const ALL: [ContactField; 5] = [
        ContactField::FirstName,
        ContactField::SecondName,
        ContactField::Email,
        ContactField::PhoneNumber,
        ContactField::PostalCode,
    ];

    /// 数据库列名 / 原始记录键名（snake_case）
    pub fn column(self) -> &'static str {
        match self {
            ContactField::FirstName => "first_name",
            ContactField::SecondName => "second_name",
            ContactField::Email => "email",
            ContactField::PhoneNumber => "phone_number",
            ContactField::PostalCode => "postal_code",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ==========================================
// ContactRecord - 联系人记录
// ==========================================
// 用途: 每行/每次请求临时构造，校验并落库后即丢弃
// 对齐: contact_record 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub first_name: String,   // 名（1-20 位字母数字）
    pub second_name: String,  // 姓（1-20 位字母数字）
    pub email: String,        // 邮箱（local@domain.tld）
    pub phone_number: String, // 电话（10 位数字，文本保存以保留前导 0）
    pub postal_code: String,  // 邮编（首位数字 + 5 位字母数字）
}

impl ContactRecord {
    /// 按字段取值
    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::SecondName => &self.second_name,
            ContactField::Email => &self.email,
            ContactField::PhoneNumber => &self.phone_number,
            ContactField::PostalCode => &self.postal_code,
        }
    }

    /// 从原始记录构造
    ///
    /// 缺失的键视为空文本（随后由校验器以 Empty 拒绝）
    pub fn from_raw(raw: &RawRecord) -> Self {
        let take = |field: ContactField| raw.get(field.column()).cloned().unwrap_or_default();

        Self {
            first_name: take(ContactField::FirstName),
            second_name: take(ContactField::SecondName),
            email: take(ContactField::Email),
            phone_number: take(ContactField::PhoneNumber),
            postal_code: take(ContactField::PostalCode),
        }
    }
}

// ==========================================
// RuleViolation - 字段规则违规原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleViolation {
    /// 空值
    Empty,
    /// 超长
    TooLong { max: usize, actual: usize },
    /// 含字母数字以外的字符
    NotAlphanumeric,
    /// 邮箱格式错误
    MalformedEmail,
    /// 电话不是 10 位数字
    NotTenDigits,
    /// 邮编格式错误
    MalformedPostalCode,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::Empty => write!(f, "不能为空"),
            RuleViolation::TooLong { max, actual } => {
                write!(f, "长度 {} 超过上限 {}", actual, max)
            }
            RuleViolation::NotAlphanumeric => write!(f, "只能包含字母或数字"),
            RuleViolation::MalformedEmail => write!(f, "邮箱格式无效"),
            RuleViolation::NotTenDigits => write!(f, "必须恰好为 10 位数字"),
            RuleViolation::MalformedPostalCode => {
                write!(f, "必须为 6 位字母数字且以数字开头")
            }
        }
    }
}

// ==========================================
// FieldViolation - 字段违规（字段 + 原因）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: ContactField,
    pub reason: RuleViolation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_keeps_values_verbatim() {
        let mut raw = RawRecord::new();
        raw.insert("first_name".to_string(), " Anna ".to_string());
        raw.insert("email".to_string(), "A@B.COM".to_string());

        let record = ContactRecord::from_raw(&raw);

        assert_eq!(record.first_name, " Anna ");
        assert_eq!(record.email, "A@B.COM");
        // 缺失键 → 空文本
        assert_eq!(record.second_name, "");
        assert_eq!(record.value(ContactField::PhoneNumber), "");
    }

    #[test]
    fn test_field_violation_display_names_column() {
        let violation = FieldViolation {
            field: ContactField::PhoneNumber,
            reason: RuleViolation::NotTenDigits,
        };
        assert!(violation.to_string().starts_with("phone_number"));
    }
}
