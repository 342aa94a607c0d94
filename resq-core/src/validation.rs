use crate::account::{AccountDraft, AccountField, AdminCodePolicy};
use crate::incident::{IncidentDraft, IncidentField};
use crate::model::Role;
use draft_kit::{ErrorSet, FormField};
use regex::Regex;
use std::sync::OnceLock;

/// Error key for the coordinate pair as a whole.
pub const LOCATION_KEY: &str = "location";

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_incident(draft: &IncidentDraft) -> ErrorSet {
    let mut errors = ErrorSet::new();

    if draft.title.trim().is_empty() {
        errors.insert(IncidentField::Title.key(), "Title is required");
    }
    if draft.description.trim().is_empty() {
        errors.insert(IncidentField::Description.key(), "Description is required");
    }
    if draft.location.purok.trim().is_empty() {
        errors.insert(IncidentField::Purok.key(), "Purok is required");
    }
    if draft.location.municipality.is_empty() {
        errors.insert(IncidentField::Municipality.key(), "Municipality is required");
    }
    if draft.location.barangay.is_empty() {
        errors.insert(IncidentField::Barangay.key(), "Barangay is required");
    }
    // A report at exactly (0, 0) cannot be told apart from "not captured".
    if !draft.location.has_coordinates() {
        errors.insert(LOCATION_KEY, "Location coordinates are required");
    }

    errors
}

pub fn validate_account(draft: &AccountDraft, policy: &AdminCodePolicy) -> ErrorSet {
    let mut errors = ErrorSet::new();

    if draft.name.trim().is_empty() {
        errors.insert(AccountField::Name.key(), "Name is required");
    }

    if draft.email.is_empty() {
        errors.insert(AccountField::Email.key(), "Email is required");
    } else if !is_email_shaped(&draft.email) {
        errors.insert(AccountField::Email.key(), "Email is invalid");
    }

    if draft.password.is_empty() {
        errors.insert(AccountField::Password.key(), "Password is required");
    } else if draft.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            AccountField::Password.key(),
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    if draft.password != draft.confirm_password {
        errors.insert(AccountField::ConfirmPassword.key(), "Passwords do not match");
    }

    if draft.role.requires_assignment() {
        let audience = match draft.role {
            Role::Admin => "admins",
            _ => "responders",
        };
        if draft.department.trim().is_empty() {
            errors.insert(
                AccountField::Department.key(),
                format!("Department is required for {audience}"),
            );
        }
        if draft.jurisdiction.trim().is_empty() {
            errors.insert(
                AccountField::Jurisdiction.key(),
                format!("Jurisdiction is required for {audience}"),
            );
        }
    }

    if draft.role == Role::Admin {
        if draft.admin_code.trim().is_empty() {
            errors.insert(AccountField::AdminCode.key(), "Admin code is required");
        } else if let AdminCodePolicy::LocalSecret(secret) = policy {
            if draft.admin_code.trim() != secret.as_str() {
                errors.insert(AccountField::AdminCode.key(), "Invalid admin code");
            }
        }
    }

    errors
}

/// `local@domain.tld` with no whitespace and non-empty parts.
pub fn is_email_shaped(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
        })
        .is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;

    fn complete_incident() -> IncidentDraft {
        IncidentDraft {
            title: "Fire".into(),
            description: "House fire".into(),
            location: Location {
                purok: "1".into(),
                barangay: "Dao".into(),
                municipality: "Dauis".into(),
                latitude: 9.62,
                longitude: 123.87,
            },
            ..IncidentDraft::default()
        }
    }

    fn keys(errors: &ErrorSet) -> Vec<&str> {
        errors.keys().collect()
    }

    #[test]
    fn complete_incident_is_clean() {
        assert!(validate_incident(&complete_incident()).is_empty());
    }

    #[test]
    fn each_missing_field_reports_only_itself() {
        let blankers: [(&str, fn(&mut IncidentDraft)); 5] = [
            ("title", |d| d.title = "   ".into()),
            ("description", |d| d.description.clear()),
            ("purok", |d| d.location.purok.clear()),
            ("municipality", |d| d.location.municipality.clear()),
            ("barangay", |d| d.location.barangay.clear()),
        ];

        for (key, blank) in blankers {
            let mut draft = complete_incident();
            blank(&mut draft);
            assert_eq!(keys(&validate_incident(&draft)), vec![key]);
        }
    }

    #[test]
    fn one_zero_coordinate_is_still_a_location() {
        let mut draft = complete_incident();
        draft.location.latitude = 0.0;
        assert!(validate_incident(&draft).is_empty());
    }

    #[test]
    fn missing_barangay_and_coordinates() {
        let draft = IncidentDraft {
            title: "Fire".into(),
            description: "House fire".into(),
            location: Location {
                purok: "1".into(),
                municipality: "Alpha".into(),
                ..Location::default()
            },
            ..IncidentDraft::default()
        };

        let errors = validate_incident(&draft);
        assert_eq!(keys(&errors), vec!["barangay", "location"]);
        assert_eq!(errors.get("barangay"), Some("Barangay is required"));
        assert_eq!(errors.get("location"), Some("Location coordinates are required"));
    }

    fn account(role: Role) -> AccountDraft {
        AccountDraft {
            name: "Ana Reyes".into(),
            email: "ana@example.ph".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role,
            ..AccountDraft::default()
        }
    }

    #[test]
    fn responder_needs_department_public_does_not() {
        let policy = AdminCodePolicy::ServerVerified;
        let responder = validate_account(&account(Role::Responder), &policy);
        assert_eq!(
            responder.get("department"),
            Some("Department is required for responders")
        );
        assert!(responder.contains("jurisdiction"));

        assert!(validate_account(&account(Role::Public), &policy).is_empty());
    }

    #[test]
    fn local_secret_rejects_wrong_admin_code() {
        let policy = AdminCodePolicy::LocalSecret("ADMIN123".into());
        let mut draft = account(Role::Admin);
        draft.department = "CDRRMO".into();
        draft.jurisdiction = "Dauis".into();

        draft.admin_code = "WRONG".into();
        assert_eq!(
            validate_account(&draft, &policy).get("adminCode"),
            Some("Invalid admin code")
        );

        draft.admin_code = "ADMIN123".into();
        assert!(validate_account(&draft, &policy).is_empty());
    }

    #[test]
    fn local_secret_ignores_surrounding_whitespace() {
        let policy = AdminCodePolicy::LocalSecret("ADMIN123".into());
        let mut draft = account(Role::Admin);
        draft.department = "CDRRMO".into();
        draft.jurisdiction = "Dauis".into();
        draft.admin_code = " ADMIN123 ".into();

        assert!(validate_account(&draft, &policy).is_empty());
        assert_eq!(draft.registration().admin_code.as_deref(), Some("ADMIN123"));
    }

    #[test]
    fn server_verified_only_requires_presence() {
        let policy = AdminCodePolicy::ServerVerified;
        let mut draft = account(Role::Admin);
        draft.department = "CDRRMO".into();
        draft.jurisdiction = "Dauis".into();
        assert_eq!(
            validate_account(&draft, &policy).get("adminCode"),
            Some("Admin code is required")
        );

        draft.admin_code = "WRONG".into();
        assert!(validate_account(&draft, &policy).is_empty());
    }

    #[test]
    fn admin_messages_name_admins() {
        let errors = validate_account(&account(Role::Admin), &AdminCodePolicy::ServerVerified);
        assert_eq!(errors.get("department"), Some("Department is required for admins"));
    }

    #[test]
    fn password_rules() {
        let policy = AdminCodePolicy::ServerVerified;
        let mut draft = account(Role::Public);
        draft.password = "abc".into();
        draft.confirm_password = "abc".into();
        assert_eq!(
            validate_account(&draft, &policy).get("password"),
            Some("Password must be at least 6 characters")
        );

        draft.password = "abcdef".into();
        let errors = validate_account(&draft, &policy);
        assert_eq!(keys(&errors), vec!["confirmPassword"]);
    }

    #[test]
    fn empty_account_reports_required_fields() {
        let errors = validate_account(&AccountDraft::default(), &AdminCodePolicy::ServerVerified);
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert!(!errors.contains("confirmPassword"));
    }

    #[test]
    fn email_shape() {
        assert!(is_email_shaped("ana@example.ph"));
        assert!(!is_email_shaped("ana@example"));
        assert!(!is_email_shaped("@example.ph"));
        assert!(!is_email_shaped("ana reyes@example.ph"));
        assert!(!is_email_shaped("ana@.ph"));
    }
}
