// Admission (onboarding): HR → Manager → IT → Employee

use crate::models::{ProcessType, Role, Rule, Step};

use super::{ProcessTemplate, TaskDefinition};

/// Field names of the admission form
pub mod fields {
    // HR
    pub const FULL_NAME: &str = "fullName";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const TAX_ID: &str = "taxId";
    pub const ADMISSION_DATE: &str = "admissionDate";
    pub const START_DATE: &str = "startDate";
    pub const CONTRACT_TYPE: &str = "contractType";
    pub const DEPARTMENT: &str = "department";
    pub const BRANCH: &str = "branch";
    pub const DIRECT_MANAGER: &str = "directManager";
    pub const MANAGER_EMAIL: &str = "managerEmail";
    pub const ROLE_TITLE: &str = "roleTitle";
    pub const WORK_REGIME: &str = "workRegime";
    pub const SALES_REGION: &str = "salesRegion";
    pub const HR_NOTES: &str = "hrNotes";

    // Manager
    pub const BUDDY_MENTOR: &str = "buddyMentor";
    pub const REQUESTED_EQUIPMENT: &str = "requestedEquipment";
    pub const REQUESTED_SOFTWARE: &str = "requestedSoftware";
    pub const REQUESTED_ACCESS: &str = "requestedAccess";
    pub const SHAREPOINT_FOLDER: &str = "sharepointFolder";
    pub const OTHER_ACCESS: &str = "otherAccess";
    pub const NEEDS_PRINTER: &str = "needsPrinter";
    pub const MANAGER_NOTES: &str = "managerNotes";

    // IT
    pub const AD_ACCOUNT_CREATED: &str = "adAccountCreated";
    pub const CORPORATE_EMAIL_CREATED: &str = "corporateEmailCreated";
    pub const M365_LICENSES: &str = "m365Licenses";
    pub const VPN_CONFIGURED: &str = "vpnConfigured";
    pub const SOFTWARE_INSTALLED: &str = "softwareInstalled";
    pub const SAP_USER_CREATED: &str = "sapUserCreated";
    pub const SALESFORCE_PROFILE_CREATED: &str = "salesforceProfileCreated";
    pub const NETWORK_FOLDERS_RELEASED: &str = "networkFoldersReleased";
    pub const PRINTERS_CONFIGURED: &str = "printersConfigured";
    pub const GENERAL_TESTS_DONE: &str = "generalTestsDone";
    pub const IT_NOTES: &str = "itNotes";

    // Employee
    pub const EQUIPMENT_RECEIPT_CONFIRMED: &str = "equipmentReceiptConfirmed";
    pub const ACCESS_CONFIRMED: &str = "accessConfirmed";
    pub const SYSTEMS_ORIENTATION_RECEIVED: &str = "systemsOrientationReceived";
    pub const KNOWS_HOW_TO_REQUEST_SUPPORT: &str = "knowsHowToRequestSupport";
    pub const EMPLOYEE_NOTES: &str = "employeeNotes";
}

use fields::*;

pub(super) fn template() -> ProcessTemplate {
    ProcessTemplate {
        process_type: ProcessType::Admission,
        title: "Admission Process".to_string(),
        description: "Full checklist for bringing in a new employee (HR, Manager, IT, Employee)"
            .to_string(),
        steps: vec![
            Step::new(
                1,
                "Employee Data",
                Role::Hr,
                "Send to Manager",
                "Data saved. A notification was sent to {managerEmail}. The process is now with the Manager.",
            ),
            Step::new(
                2,
                "Manager Definitions",
                Role::Manager,
                "Send to IT",
                "Manager settings saved. The process was sent to IT to set up access.",
            ),
            Step::new(
                3,
                "IT Setup",
                Role::It,
                "Send to Employee",
                "IT setup complete. The checklist is ready for the employee's final check.",
            ),
            Step::new(
                4,
                "Documents",
                Role::Employee,
                "Finalize Admission",
                "Admission completed and saved.",
            ),
        ],
        tasks: vec![
            TaskDefinition::new(
                "admission.personal_data",
                "Collect full name, tax id and personal data",
                Role::Hr,
                Rule::and(
                    "personal_data",
                    "Full name plus a display name or tax id",
                    vec![
                        Rule::field_filled(FULL_NAME),
                        Rule::or(
                            "identifier",
                            "Display name or tax id",
                            vec![Rule::field_filled(DISPLAY_NAME), Rule::field_filled(TAX_ID)],
                        ),
                    ],
                ),
            ),
            TaskDefinition::new(
                "admission.dates",
                "Set admission and start dates",
                Role::Hr,
                Rule::and(
                    "dates",
                    "Admission and start dates",
                    vec![Rule::field_filled(ADMISSION_DATE), Rule::field_filled(START_DATE)],
                ),
            ),
            TaskDefinition::new(
                "admission.department_role",
                "Set department, role and direct manager",
                Role::Hr,
                Rule::and(
                    "department_role",
                    "Department and role",
                    vec![Rule::field_filled(DEPARTMENT), Rule::field_filled(ROLE_TITLE)],
                ),
            ),
            TaskDefinition::new(
                "admission.buddy",
                "Assign a buddy/mentor to the new employee",
                Role::Manager,
                Rule::field_filled(BUDDY_MENTOR),
            ),
            TaskDefinition::new(
                "admission.equipment_request",
                "Request equipment (notebook, monitor, ...)",
                Role::Manager,
                Rule::field_filled(REQUESTED_EQUIPMENT),
            ),
            TaskDefinition::new(
                "admission.access_request",
                "Request specific access (folders, systems)",
                Role::Manager,
                Rule::or(
                    "access_request",
                    "Requested access or a SharePoint folder",
                    vec![
                        Rule::field_filled(REQUESTED_ACCESS),
                        Rule::field_filled(SHAREPOINT_FOLDER),
                    ],
                ),
            ),
            TaskDefinition::new(
                "admission.ad_account",
                "Create the Active Directory account",
                Role::It,
                Rule::field_affirmed(AD_ACCOUNT_CREATED),
            ),
            TaskDefinition::new(
                "admission.corporate_email",
                "Create the corporate e-mail",
                Role::It,
                Rule::field_affirmed(CORPORATE_EMAIL_CREATED),
            ),
            TaskDefinition::new(
                "admission.vpn",
                "Configure VPN (if applicable)",
                Role::It,
                Rule::field_affirmed(VPN_CONFIGURED),
            ),
            TaskDefinition::new(
                "admission.sap_user",
                "Create the SAP B1 user",
                Role::It,
                Rule::field_affirmed(SAP_USER_CREATED),
            ),
            TaskDefinition::new(
                "admission.salesforce_profile",
                "Create the Salesforce profile",
                Role::It,
                Rule::field_affirmed(SALESFORCE_PROFILE_CREATED),
            ),
            TaskDefinition::new(
                "admission.network_folders",
                "Release network folder access",
                Role::It,
                Rule::field_affirmed(NETWORK_FOLDERS_RELEASED),
            ),
            TaskDefinition::new(
                "admission.printers",
                "Configure printers",
                Role::It,
                Rule::field_affirmed(PRINTERS_CONFIGURED),
            ),
            TaskDefinition::new(
                "admission.access_tests",
                "Run general access tests",
                Role::It,
                Rule::field_affirmed(GENERAL_TESTS_DONE),
            ),
            TaskDefinition::new(
                "admission.equipment_receipt",
                "Confirm receipt of equipment",
                Role::Employee,
                Rule::field_affirmed(EQUIPMENT_RECEIPT_CONFIRMED),
            ),
            TaskDefinition::new(
                "admission.access_confirmation",
                "Confirm that access works",
                Role::Employee,
                Rule::field_affirmed(ACCESS_CONFIRMED),
            ),
            TaskDefinition::new(
                "admission.systems_orientation",
                "Receive the initial systems orientation",
                Role::Employee,
                Rule::field_affirmed(SYSTEMS_ORIENTATION_RECEIVED),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_table_shape() {
        let template = template();
        assert_eq!(template.tasks.len(), 17);

        let count = |role: Role| template.tasks.iter().filter(|t| t.owner_role == role).count();
        assert_eq!(count(Role::Hr), 3);
        assert_eq!(count(Role::Manager), 3);
        assert_eq!(count(Role::It), 8);
        assert_eq!(count(Role::Employee), 3);
    }

    #[test]
    fn test_submit_labels() {
        let labels: Vec<_> = template().steps.iter().map(|s| s.submit_label.clone()).collect();
        assert_eq!(
            labels,
            vec!["Send to Manager", "Send to IT", "Send to Employee", "Finalize Admission"]
        );
    }

    #[test]
    fn test_rules_only_read_catalogued_fields() {
        let catalogue = [
            FULL_NAME, DISPLAY_NAME, TAX_ID, ADMISSION_DATE, START_DATE, DEPARTMENT, ROLE_TITLE,
            BUDDY_MENTOR, REQUESTED_EQUIPMENT, REQUESTED_ACCESS, SHAREPOINT_FOLDER,
            AD_ACCOUNT_CREATED, CORPORATE_EMAIL_CREATED, VPN_CONFIGURED, SAP_USER_CREATED,
            SALESFORCE_PROFILE_CREATED, NETWORK_FOLDERS_RELEASED, PRINTERS_CONFIGURED,
            GENERAL_TESTS_DONE, EQUIPMENT_RECEIPT_CONFIRMED, ACCESS_CONFIRMED,
            SYSTEMS_ORIENTATION_RECEIVED,
        ];
        for task in template().tasks {
            for field in task.rule.referenced_fields() {
                assert!(catalogue.contains(&field), "{} reads unknown field {}", task.id, field);
            }
        }
    }
}
