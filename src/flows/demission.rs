// Demission (offboarding): HR → Manager → IT → Payroll

use crate::models::{ProcessType, Role, Rule, Step};

use super::{ProcessTemplate, TaskDefinition};

/// Field names of the demission form
pub mod fields {
    // HR
    pub const FULL_NAME: &str = "fullName";
    pub const ROLE_TITLE: &str = "roleTitle";
    pub const DEPARTMENT: &str = "department";
    pub const SALES_REGION: &str = "salesRegion";
    pub const NOTICE_DATE: &str = "noticeDate";
    pub const LAST_WORKING_DAY: &str = "lastWorkingDay";
    pub const TERMINATION_REASON: &str = "terminationReason";
    pub const NOTICE_TYPE: &str = "noticeType";
    pub const EXIT_EXAM_DATE: &str = "exitExamDate";
    pub const EQUIPMENT_LIST: &str = "equipmentList";
    pub const HR_NOTES: &str = "hrNotes";

    // Manager
    pub const EQUIPMENT_RETURNED: &str = "equipmentReturned";
    pub const PENDING_WORK: &str = "pendingWork";
    pub const BACKUP_DONE: &str = "backupDone";
    pub const PROJECT_HANDED_OVER: &str = "projectHandedOver";
    pub const KEYS_RETURNED: &str = "keysReturned";
    pub const MANAGER_NOTES: &str = "managerNotes";

    // IT
    pub const ACCOUNT_DISABLED: &str = "accountDisabled";
    pub const EMAIL_DISABLED: &str = "emailDisabled";
    pub const VPN_REVOKED: &str = "vpnRevoked";
    pub const LICENSES_REMOVED: &str = "licensesRemoved";
    pub const HARDWARE_COLLECTED: &str = "hardwareCollected";
    pub const SAP_USER_DEACTIVATED: &str = "sapUserDeactivated";
    pub const SALESFORCE_USER_DEACTIVATED: &str = "salesforceUserDeactivated";
    pub const IT_NOTES: &str = "itNotes";

    // Payroll
    pub const SEVERANCE_CALCULATED: &str = "severanceCalculated";
    pub const PAYMENT_SLIPS_ISSUED: &str = "paymentSlipsIssued";
    pub const WORK_CARD_CLOSED: &str = "workCardClosed";
    pub const DISMISSAL_FILES_ARCHIVED: &str = "dismissalFilesArchived";
    pub const PAYROLL_NOTES: &str = "payrollNotes";
}

use fields::*;

pub(super) fn template() -> ProcessTemplate {
    ProcessTemplate {
        process_type: ProcessType::Demission,
        title: "Demission Process".to_string(),
        description: "Offboarding flow and access revocation for leaving employees".to_string(),
        steps: vec![
            Step::new(
                1,
                "Termination Data",
                Role::Hr,
                "Send to Manager",
                "Termination data saved. The process is now with the Manager.",
            ),
            Step::new(
                2,
                "Management & Equipment",
                Role::Manager,
                "Send to IT",
                "Equipment return recorded. The process was sent to IT to revoke access.",
            ),
            Step::new(
                3,
                "IT Revocation",
                Role::It,
                "Send to Payroll",
                "Access revoked. The process is now with Payroll for the final settlement.",
            ),
            Step::new(
                4,
                "Settlement & Payment",
                Role::Payroll,
                "Finalize Demission",
                "Demission completed and saved.",
            ),
        ],
        tasks: vec![
            TaskDefinition::new(
                "demission.notice",
                "Receive the resignation letter or notify the employee",
                Role::Hr,
                Rule::field_filled(FULL_NAME),
            ),
            TaskDefinition::new(
                "demission.last_day",
                "Set the last working day",
                Role::Hr,
                Rule::field_filled(LAST_WORKING_DAY),
            ),
            TaskDefinition::new(
                "demission.exit_exam",
                "Schedule the exit medical exam",
                Role::Hr,
                Rule::field_filled(EXIT_EXAM_DATE),
            ),
            TaskDefinition::new(
                "demission.equipment_returned",
                "Collect physical equipment (notebook, phone)",
                Role::Manager,
                Rule::or(
                    "equipment_returned",
                    "Returned to the manager or collected by IT",
                    vec![
                        Rule::field_affirmed(EQUIPMENT_RETURNED),
                        Rule::field_true(HARDWARE_COLLECTED),
                    ],
                ),
            ),
            TaskDefinition::new(
                "demission.pending_work",
                "Review pending work",
                Role::Manager,
                Rule::field_filled(PENDING_WORK),
            ),
            TaskDefinition::new(
                "demission.ad_account_disabled",
                "Disable the AD account right after departure",
                Role::It,
                Rule::field_true(ACCOUNT_DISABLED),
            ),
            TaskDefinition::new(
                "demission.email_disabled",
                "Disable the corporate e-mail",
                Role::It,
                Rule::field_true(EMAIL_DISABLED),
            ),
            TaskDefinition::new(
                "demission.vpn_revoked",
                "Revoke VPN access",
                Role::It,
                Rule::field_true(VPN_REVOKED),
            ),
            TaskDefinition::new(
                "demission.sap_user_deactivated",
                "Deactivate the SAP B1 user",
                Role::It,
                Rule::field_true(SAP_USER_DEACTIVATED),
            ),
            TaskDefinition::new(
                "demission.salesforce_user_deactivated",
                "Deactivate the Salesforce user",
                Role::It,
                Rule::field_true(SALESFORCE_USER_DEACTIVATED),
            ),
            TaskDefinition::new(
                "demission.severance",
                "Calculate severance pay",
                Role::Payroll,
                Rule::field_true(SEVERANCE_CALCULATED),
            ),
            TaskDefinition::new(
                "demission.payment_slips",
                "Issue payment slips",
                Role::Payroll,
                Rule::field_true(PAYMENT_SLIPS_ISSUED),
            ),
            TaskDefinition::new(
                "demission.work_card",
                "Close the work card record",
                Role::Payroll,
                Rule::field_true(WORK_CARD_CLOSED),
            ),
            TaskDefinition::new(
                "demission.archive",
                "Archive the dismissal documents",
                Role::Payroll,
                Rule::field_true(DISMISSAL_FILES_ARCHIVED),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldData;
    use serde_json::json;

    #[test]
    fn test_task_table_shape() {
        let template = template();
        assert_eq!(template.tasks.len(), 14);
        assert_eq!(template.steps[3].owner_role, Role::Payroll);
        assert_eq!(template.steps[3].submit_label, "Finalize Demission");
    }

    #[test]
    fn test_equipment_rule_accepts_either_party() {
        let template = template();
        let task = template
            .tasks
            .iter()
            .find(|t| t.id.as_str() == "demission.equipment_returned")
            .unwrap();

        let mut data = FieldData::new();
        assert!(!task.rule.evaluate(&data));

        data.insert(EQUIPMENT_RETURNED.into(), json!("Partial"));
        assert!(!task.rule.evaluate(&data));

        data.insert(HARDWARE_COLLECTED.into(), json!(true));
        assert!(task.rule.evaluate(&data));

        data.insert(HARDWARE_COLLECTED.into(), json!(false));
        data.insert(EQUIPMENT_RETURNED.into(), json!("Yes"));
        assert!(task.rule.evaluate(&data));
    }
}
