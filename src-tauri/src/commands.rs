use crate::runtime::publish_notice;
use crate::state::AppState;
use draft_kit::{ErrorSet, FormField, Notice, SubmitOutcome};
use futures::executor::block_on;
use resq_core::account::{AccountDraft, AccountField, AccountRegistrationController};
use resq_core::geolocation::GeolocationHost;
use resq_core::incident::{IncidentDraft, IncidentDraftController, IncidentField};
use resq_core::model::{GeoPosition, Incident, User};
use resq_core::navigation::{self, NavMenu, Route};
use resq_core::repository::{AuthCollaborator, IncidentRepository};
use resq_core::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Submitted,
    Invalid,
    Failed,
    Busy,
    Redirected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDto<T> {
    pub status: OutcomeStatus,
    pub errors: ErrorSet,
    pub notice: Option<Notice>,
    pub route: Option<String>,
    pub value: Option<T>,
}

impl<T> OutcomeDto<T> {
    fn redirected(route: Route) -> Self {
        Self {
            status: OutcomeStatus::Redirected,
            errors: ErrorSet::new(),
            notice: None,
            route: Some(route.path()),
            value: None,
        }
    }
}

fn outcome_dto<T>(
    outcome: SubmitOutcome<T>,
    errors: &ErrorSet,
    notice: Option<&Notice>,
    route: impl FnOnce(&T) -> Option<Route>,
) -> OutcomeDto<T> {
    let (status, route, value) = match outcome {
        SubmitOutcome::Submitted(value) => {
            (OutcomeStatus::Submitted, route(&value).map(|r| r.path()), Some(value))
        }
        SubmitOutcome::Invalid(_) => (OutcomeStatus::Invalid, None, None),
        SubmitOutcome::Failed(_) => (OutcomeStatus::Failed, None, None),
        SubmitOutcome::Busy => (OutcomeStatus::Busy, None, None),
    };
    OutcomeDto {
        status,
        errors: errors.clone(),
        notice: notice.cloned(),
        route,
        value,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSubmitRequest {
    /// Present when editing an existing report.
    #[serde(default)]
    pub incident_id: Option<String>,
    pub draft: IncidentDraft,
    #[serde(default)]
    pub terms_accepted: bool,
    #[serde(default)]
    pub has_callback: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateDto {
    pub draft: IncidentDraft,
    pub position: Option<GeoPosition>,
    pub notice: Option<Notice>,
}

pub fn list_municipalities(state: &AppState) -> Vec<String> {
    state.hierarchy.municipalities().map(str::to_string).collect()
}

pub fn list_barangays(state: &AppState, municipality: String) -> Vec<String> {
    state.hierarchy.barangays_of(&municipality).to_vec()
}

pub fn validate_incident(_state: &AppState, draft: IncidentDraft) -> ErrorSet {
    validation::validate_incident(&draft)
}

pub fn submit_incident(
    state: &AppState,
    request: IncidentSubmitRequest,
) -> Result<OutcomeDto<Incident>, String> {
    let user = state.store.current_user();
    let mut controller = match &request.incident_id {
        Some(id) => {
            let incident = state
                .store
                .get_incident(id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("incident '{id}' not found"))?;
            IncidentDraftController::edit(&incident, user, state.incident_services())
        }
        None => IncidentDraftController::create(user, state.incident_services()),
    };
    if request.terms_accepted {
        controller.accept_terms();
    }
    load_incident_draft(&mut controller, &request.draft)?;

    let outcome = block_on(controller.submit());
    publish_notice(&*state.sink, "incident", controller.notice());
    Ok(outcome_dto(
        outcome,
        controller.errors(),
        controller.notice(),
        |incident| controller.success_route(incident, request.has_callback),
    ))
}

pub fn detect_location(state: &AppState, draft: IncidentDraft) -> Result<LocateDto, String> {
    let mut controller =
        IncidentDraftController::create(state.store.current_user(), state.incident_services());
    load_incident_draft(&mut controller, &draft)?;

    let position = block_on(controller.detect_location()).ok();
    publish_notice(&*state.sink, "incident", controller.notice());
    Ok(LocateDto {
        draft: controller.draft().clone(),
        position,
        notice: controller.notice().cloned(),
    })
}

pub fn validate_account(state: &AppState, draft: AccountDraft) -> ErrorSet {
    validation::validate_account(&draft, &state.config.admin_code_policy())
}

pub fn register_account(state: &AppState, draft: AccountDraft) -> Result<OutcomeDto<User>, String> {
    let mut controller = AccountRegistrationController::new(
        Arc::clone(&state.store),
        state.config.admin_code_policy(),
    );
    if let Some(route) = controller.entry_route() {
        return Ok(OutcomeDto::redirected(route));
    }

    for field in AccountField::ALL {
        controller
            .set_field(*field, &account_value(&draft, *field))
            .map_err(|e| e.to_string())?;
    }

    let outcome = block_on(controller.submit());
    publish_notice(&*state.sink, "account", controller.notice());
    Ok(outcome_dto(
        outcome,
        controller.errors(),
        controller.notice(),
        |_| Some(controller.success_route()),
    ))
}

pub fn current_user(state: &AppState) -> Option<User> {
    state.store.current_user()
}

pub fn visible_menu(state: &AppState) -> NavMenu {
    let role = state.store.current_user().map(|user| user.role);
    navigation::visible_menu(&state.menu, role, &state.capabilities)
}

pub fn active_paths(state: &AppState, current: String) -> Vec<String> {
    let menu = visible_menu(state);
    navigation::active_paths(&menu, &current)
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn list_incidents(state: &AppState) -> Result<Vec<Incident>, String> {
    state.store.list_incidents().map_err(|e| e.to_string())
}

/// Replays a UI-side draft through the controller's edit path so every
/// cascade and membership check applies. Fields already matching the
/// controller's draft are skipped, so an edit seed keeps its stored location.
fn load_incident_draft<R, H>(
    controller: &mut IncidentDraftController<R, H>,
    draft: &IncidentDraft,
) -> Result<(), String>
where
    R: IncidentRepository,
    H: GeolocationHost,
{
    for field in IncidentField::ALL {
        let value = incident_value(draft, *field);
        if incident_value(controller.draft(), *field) == value {
            continue;
        }
        controller
            .set_field(*field, &value)
            .map_err(|e| e.to_string())?;
    }

    while controller.remove_image(0).is_some() {}
    for url in &draft.images {
        controller.add_image(url);
    }
    Ok(())
}

fn incident_value(draft: &IncidentDraft, field: IncidentField) -> String {
    let location = &draft.location;
    match field {
        IncidentField::Title => draft.title.clone(),
        IncidentField::Description => draft.description.clone(),
        IncidentField::Type => draft.incident_type.as_str().to_string(),
        IncidentField::Severity => draft.severity.as_str().to_string(),
        IncidentField::Purok => location.purok.clone(),
        IncidentField::Municipality => location.municipality.clone(),
        IncidentField::Barangay => location.barangay.clone(),
        IncidentField::Latitude => location.latitude.to_string(),
        IncidentField::Longitude => location.longitude.to_string(),
    }
}

fn account_value(draft: &AccountDraft, field: AccountField) -> String {
    match field {
        AccountField::Name => draft.name.clone(),
        AccountField::Email => draft.email.clone(),
        AccountField::Password => draft.password.clone(),
        AccountField::ConfirmPassword => draft.confirm_password.clone(),
        AccountField::Role => draft.role.as_str().to_string(),
        AccountField::Department => draft.department.clone(),
        AccountField::Jurisdiction => draft.jurisdiction.clone(),
        AccountField::AdminCode => draft.admin_code.clone(),
    }
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn list_municipalities_cmd(state: tauri::State<'_, AppState>) -> Vec<String> {
    list_municipalities(&state)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn list_barangays_cmd(state: tauri::State<'_, AppState>, municipality: String) -> Vec<String> {
    list_barangays(&state, municipality)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn validate_incident_cmd(state: tauri::State<'_, AppState>, draft: IncidentDraft) -> ErrorSet {
    validate_incident(&state, draft)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn submit_incident_cmd(
    state: tauri::State<'_, AppState>,
    request: IncidentSubmitRequest,
) -> Result<OutcomeDto<Incident>, String> {
    submit_incident(&state, request)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn detect_location_cmd(
    state: tauri::State<'_, AppState>,
    draft: IncidentDraft,
) -> Result<LocateDto, String> {
    detect_location(&state, draft)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn validate_account_cmd(state: tauri::State<'_, AppState>, draft: AccountDraft) -> ErrorSet {
    validate_account(&state, draft)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn register_account_cmd(
    state: tauri::State<'_, AppState>,
    draft: AccountDraft,
) -> Result<OutcomeDto<User>, String> {
    register_account(&state, draft)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn current_user_cmd(state: tauri::State<'_, AppState>) -> Option<User> {
    current_user(&state)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn visible_menu_cmd(state: tauri::State<'_, AppState>) -> NavMenu {
    visible_menu(&state)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn active_paths_cmd(state: tauri::State<'_, AppState>, current: String) -> Vec<String> {
    active_paths(&state, current)
}

#[cfg(feature = "tauri-app")]
#[tauri::command(rename_all = "camelCase")]
pub fn list_incidents_cmd(state: tauri::State<'_, AppState>) -> Result<Vec<Incident>, String> {
    list_incidents(&state)
}
