// ==========================================
// 联系人导入系统 - 记录校验器
// ==========================================
// 职责: 对整条记录逐字段应用规则，收集全部违规
// 约束: 所有字段均校验（不在首个失败处短路），违规按字段顺序排列
// ==========================================

use crate::domain::contact::{ContactField, ContactRecord, FieldViolation, RawRecord};
use crate::importer::field_rules::check_field;

// ==========================================
// RecordVerdict - 记录校验结论
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordVerdict {
    Accepted,
    Rejected(Vec<FieldViolation>),
}

impl RecordVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RecordVerdict::Accepted)
    }

    /// 全部违规（通过时为空）
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            RecordVerdict::Accepted => &[],
            RecordVerdict::Rejected(v) => v,
        }
    }

    /// 首个违规（批量导入每行只报告这一条）
    pub fn first_violation(&self) -> Option<&FieldViolation> {
        self.violations().first()
    }
}

// ==========================================
// RecordValidator
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验一条记录
    pub fn validate(&self, record: &ContactRecord) -> RecordVerdict {
        let violations: Vec<FieldViolation> = ContactField::ALL
            .iter()
            .filter_map(|&field| {
                check_field(field, record.value(field))
                    .err()
                    .map(|reason| FieldViolation { field, reason })
            })
            .collect();

        if violations.is_empty() {
            RecordVerdict::Accepted
        } else {
            RecordVerdict::Rejected(violations)
        }
    }

    /// 从原始记录构造并校验
    ///
    /// # 返回
    /// - Ok(ContactRecord): 校验通过的记录
    /// - Err(Vec<FieldViolation>): 全部违规
    pub fn validate_raw(&self, raw: &RawRecord) -> Result<ContactRecord, Vec<FieldViolation>> {
        let record = ContactRecord::from_raw(raw);
        match self.validate(&record) {
            RecordVerdict::Accepted => Ok(record),
            RecordVerdict::Rejected(violations) => Err(violations),
        }
    }

    /// 表单预览：只返回违规列表，与服务端共用同一套规则
    pub fn preview(&self, raw: &RawRecord) -> Vec<FieldViolation> {
        self.validate(&ContactRecord::from_raw(raw))
            .violations()
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::RuleViolation;

    fn anna() -> ContactRecord {
        ContactRecord {
            first_name: "Anna".to_string(),
            second_name: "Bell".to_string(),
            email: "a@b.com".to_string(),
            phone_number: "0871234567".to_string(),
            postal_code: "1A2B3C".to_string(),
        }
    }

    #[test]
    fn test_valid_record_accepted() {
        let verdict = RecordValidator::new().validate(&anna());
        assert!(verdict.is_accepted());
        assert!(verdict.first_violation().is_none());
    }

    #[test]
    fn test_all_failures_collected_in_field_order() {
        let record = ContactRecord {
            first_name: "Anna!".to_string(),
            second_name: "Bell".to_string(),
            email: "a@b".to_string(),
            phone_number: "12345".to_string(),
            postal_code: "A12345".to_string(),
        };

        let verdict = RecordValidator::new().validate(&record);
        let fields: Vec<ContactField> = verdict.violations().iter().map(|v| v.field).collect();

        assert_eq!(
            fields,
            vec![
                ContactField::FirstName,
                ContactField::Email,
                ContactField::PhoneNumber,
                ContactField::PostalCode,
            ]
        );
        assert_eq!(verdict.first_violation().unwrap().field, ContactField::FirstName);
    }

    #[test]
    fn test_short_phone_rejected_referencing_phone_number() {
        let mut record = anna();
        record.phone_number = "12345".to_string();

        let verdict = RecordValidator::new().validate(&record);
        let first = verdict.first_violation().unwrap();

        assert_eq!(first.field, ContactField::PhoneNumber);
        assert_eq!(first.reason, RuleViolation::NotTenDigits);
        assert!(first.to_string().contains("phone_number"));
    }

    #[test]
    fn test_validate_raw_missing_keys_rejected_as_empty() {
        let mut raw = RawRecord::new();
        raw.insert("first_name".to_string(), "Anna".to_string());

        let violations = RecordValidator::new().validate_raw(&raw).unwrap_err();

        assert_eq!(violations.len(), 4);
        assert!(violations.iter().all(|v| v.reason == RuleViolation::Empty));
    }

    #[test]
    fn test_validate_raw_does_not_trim() {
        let mut raw = RawRecord::new();
        raw.insert("first_name".to_string(), "Anna".to_string());
        raw.insert("second_name".to_string(), "Bell".to_string());
        raw.insert("email".to_string(), "a@b.com".to_string());
        raw.insert("phone_number".to_string(), " 0871234567".to_string());
        raw.insert("postal_code".to_string(), "1A2B3C".to_string());

        let violations = RecordValidator::new().validate_raw(&raw).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, ContactField::PhoneNumber);
    }

    #[test]
    fn test_preview_matches_validate() {
        let mut raw = RawRecord::new();
        raw.insert("first_name".to_string(), "Anna".to_string());
        raw.insert("email".to_string(), "bad".to_string());

        let validator = RecordValidator::new();
        let preview = validator.preview(&raw);
        let direct = validator.validate_raw(&raw).unwrap_err();

        assert_eq!(preview, direct);
    }
}
