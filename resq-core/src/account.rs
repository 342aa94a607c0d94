use crate::model::{Registration, Role, User};
use crate::navigation::Route;
use crate::repository::{AuthCollaborator, AuthError};
use crate::validation::validate_account;
use draft_kit::{
    Draft, DraftController, DraftError, ErrorSet, FormField, Notice, Phase, SubmitDelegate,
    SubmitOutcome, TaskHandle,
};
use draft_kit_derive::FormField;
use serde::Deserialize;
use std::fmt;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FormField)]
pub enum AccountField {
    #[field("name")]
    Name,
    #[field("email")]
    Email,
    #[field("password")]
    Password,
    #[field("confirmPassword")]
    ConfirmPassword,
    #[field("role")]
    Role,
    #[field("department")]
    Department,
    #[field("jurisdiction")]
    Jurisdiction,
    #[field("adminCode")]
    AdminCode,
}

/// Who checks the admin registration code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AdminCodePolicy {
    /// Presence is checked locally; the auth collaborator decides validity.
    #[default]
    ServerVerified,
    /// The code is compared against a secret held by the client.
    LocalSecret(String),
}

/// Deserializable so a UI can send the whole form; never serialized back.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub department: String,
    pub jurisdiction: String,
    pub admin_code: String,
}

impl fmt::Debug for AccountDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDraft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("department", &self.department)
            .field("jurisdiction", &self.jurisdiction)
            .finish_non_exhaustive()
    }
}

impl AccountDraft {
    /// Fields the form must show for the selected role.
    pub fn required_fields(&self) -> Vec<AccountField> {
        let mut fields = vec![
            AccountField::Name,
            AccountField::Email,
            AccountField::Password,
            AccountField::ConfirmPassword,
            AccountField::Role,
        ];
        if self.role.requires_assignment() {
            fields.extend([AccountField::Department, AccountField::Jurisdiction]);
        }
        if self.role == Role::Admin {
            fields.push(AccountField::AdminCode);
        }
        fields
    }

    /// Values left over from another role are dropped.
    pub fn registration(&self) -> Registration {
        let assigned = self.role.requires_assignment();
        Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
            role: self.role,
            department: assigned.then(|| self.department.trim().to_string()),
            jurisdiction: assigned.then(|| self.jurisdiction.trim().to_string()),
            admin_code: (self.role == Role::Admin).then(|| self.admin_code.trim().to_string()),
        }
    }
}

impl Draft for AccountDraft {
    type Field = AccountField;
    type Context = AdminCodePolicy;

    fn apply(
        &mut self,
        field: AccountField,
        value: &str,
        _policy: &AdminCodePolicy,
    ) -> Result<(), DraftError> {
        match field {
            AccountField::Name => self.name = value.to_string(),
            AccountField::Email => self.email = value.to_string(),
            AccountField::Password => self.password = value.to_string(),
            AccountField::ConfirmPassword => self.confirm_password = value.to_string(),
            AccountField::Role => {
                self.role = value.parse().map_err(|_| DraftError::InvalidValue {
                    field: field.key(),
                    value: value.to_string(),
                })?;
            }
            AccountField::Department => self.department = value.to_string(),
            AccountField::Jurisdiction => self.jurisdiction = value.to_string(),
            AccountField::AdminCode => self.admin_code = value.to_string(),
        }
        Ok(())
    }

    fn validate(&self, policy: &AdminCodePolicy) -> ErrorSet {
        validate_account(self, policy)
    }
}

pub struct Registrar<A> {
    auth: A,
}

impl<A: AuthCollaborator> SubmitDelegate<AccountDraft> for Registrar<A> {
    type Output = User;
    type Error = AuthError;

    async fn submit(&self, draft: &AccountDraft) -> Result<User, AuthError> {
        let user = self.auth.register(draft.registration()).await?;
        info!(user_id = %user.id, role = %user.role, "account registered");
        Ok(user)
    }

    fn failure_notice(&self, _error: &AuthError) -> String {
        "Registration failed. Please try again.".into()
    }

    fn rejected_fields(&self, error: &AuthError) -> ErrorSet {
        match error {
            AuthError::DuplicateEmail(_) => {
                [(AccountField::Email.key(), "Email is already registered")].into_iter().collect()
            }
            AuthError::InvalidAdminCode => {
                [(AccountField::AdminCode.key(), "Invalid admin code")].into_iter().collect()
            }
            AuthError::Invalid(_) | AuthError::Unavailable(_) => ErrorSet::new(),
        }
    }
}

/// Sign-up form.
pub struct AccountRegistrationController<A> {
    form: DraftController<AccountDraft, Registrar<A>>,
}

impl<A: AuthCollaborator> AccountRegistrationController<A> {
    pub fn new(auth: A, policy: AdminCodePolicy) -> Self {
        Self {
            form: DraftController::new(AccountDraft::default(), policy, Registrar { auth }),
        }
    }

    /// Where to send a visitor who opens the form already signed in.
    pub fn entry_route(&self) -> Option<Route> {
        self.form
            .delegate()
            .auth
            .current_user()
            .map(|_| Route::Landing)
    }

    pub fn draft(&self) -> &AccountDraft {
        self.form.draft()
    }

    pub fn errors(&self) -> &ErrorSet {
        self.form.errors()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.form.notice()
    }

    pub fn phase(&self) -> Phase {
        self.form.phase()
    }

    pub fn policy(&self) -> &AdminCodePolicy {
        self.form.context()
    }

    pub fn is_busy(&self) -> bool {
        self.form.is_busy()
    }

    pub fn submit_task(&self) -> TaskHandle {
        self.form.submit_task()
    }

    pub fn required_fields(&self) -> Vec<AccountField> {
        self.form.draft().required_fields()
    }

    pub fn select_role(&mut self, role: Role) {
        self.form
            .update(&[AccountField::Role.key()], |draft| draft.role = role);
        self.drop_hidden_field_errors();
    }

    pub fn set_field(&mut self, field: AccountField, value: &str) -> Result<(), DraftError> {
        self.form.set_field(field, value)?;
        if field == AccountField::Role {
            self.drop_hidden_field_errors();
        }
        Ok(())
    }

    pub fn set_field_by_key(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let field =
            AccountField::from_key(key).ok_or_else(|| DraftError::UnknownField(key.to_string()))?;
        self.set_field(field, value)
    }

    fn drop_hidden_field_errors(&mut self) {
        let shown = self.required_fields();
        let hidden: Vec<&str> = AccountField::ALL
            .iter()
            .filter(|field| !shown.contains(field))
            .map(|field| field.key())
            .collect();
        self.form.clear_errors(&hidden);
    }

    pub async fn submit(&mut self) -> SubmitOutcome<User> {
        self.form.submit().await
    }

    pub fn success_route(&self) -> Route {
        Route::Landing
    }
}
