use crate::capability::{AccessDenied, Capability, CapabilityTable};
use crate::geolocation::{GeoError, GeolocationHost, GeolocationProbe};
use crate::model::{
    GeoPosition, Incident, IncidentPayload, IncidentStatus, IncidentType, Location, NewIncident,
    Severity, User,
};
use crate::navigation::Route;
use crate::repository::{IncidentRepository, RepositoryError};
use crate::validation::{validate_incident, LOCATION_KEY};
use draft_kit::{
    Busy, Draft, DraftController, DraftError, ErrorSet, FormField, Notice, Phase, SubmitDelegate,
    SubmitOutcome, TaskHandle,
};
use draft_kit_derive::FormField;
use location_registry::LocationHierarchy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FormField)]
pub enum IncidentField {
    #[field("title")]
    Title,
    #[field("description")]
    Description,
    #[field("type")]
    Type,
    #[field("severity")]
    Severity,
    #[field("purok")]
    Purok,
    #[field("municipality")]
    Municipality,
    #[field("barangay")]
    Barangay,
    #[field("latitude")]
    Latitude,
    #[field("longitude")]
    Longitude,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncidentDraft {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub location: Location,
    pub images: Vec<String>,
}

impl IncidentDraft {
    /// Edit-mode seed. The stored location is taken as is, even if the
    /// barangay is no longer listed for its municipality.
    pub fn from_incident(incident: &Incident) -> Self {
        Self {
            title: incident.title.clone(),
            description: incident.description.clone(),
            incident_type: incident.incident_type,
            severity: incident.severity,
            location: incident.location.clone(),
            images: incident.images.clone().unwrap_or_default(),
        }
    }

    pub fn coordinates(&self) -> Option<GeoPosition> {
        self.location
            .has_coordinates()
            .then(|| GeoPosition::new(self.location.latitude, self.location.longitude))
    }

    pub fn payload(&self) -> IncidentPayload {
        IncidentPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            incident_type: self.incident_type,
            severity: self.severity,
            location: Location {
                purok: self.location.purok.trim().to_string(),
                ..self.location.clone()
            },
            images: (!self.images.is_empty()).then(|| self.images.clone()),
        }
    }
}

impl Draft for IncidentDraft {
    type Field = IncidentField;
    type Context = Arc<LocationHierarchy>;

    fn apply(
        &mut self,
        field: IncidentField,
        value: &str,
        hierarchy: &Arc<LocationHierarchy>,
    ) -> Result<(), DraftError> {
        match field {
            IncidentField::Title => self.title = value.to_string(),
            IncidentField::Description => self.description = value.to_string(),
            IncidentField::Type => {
                self.incident_type = value.parse().map_err(|_| invalid(field, value))?;
            }
            IncidentField::Severity => {
                self.severity = value.parse().map_err(|_| invalid(field, value))?;
            }
            IncidentField::Purok => self.location.purok = value.to_string(),
            IncidentField::Municipality => {
                self.location.municipality = value.to_string();
                self.location.barangay.clear();
            }
            IncidentField::Barangay => {
                if !value.is_empty() && !hierarchy.contains(&self.location.municipality, value) {
                    return Err(DraftError::NotAllowed {
                        field: field.key(),
                        value: value.to_string(),
                    });
                }
                self.location.barangay = value.to_string();
            }
            IncidentField::Latitude => {
                self.location.latitude = parse_coordinate(field, value, 90.0)?;
            }
            IncidentField::Longitude => {
                self.location.longitude = parse_coordinate(field, value, 180.0)?;
            }
        }
        Ok(())
    }

    fn validate(&self, _hierarchy: &Arc<LocationHierarchy>) -> ErrorSet {
        validate_incident(self)
    }
}

fn invalid(field: IncidentField, value: &str) -> DraftError {
    DraftError::InvalidValue {
        field: field.key(),
        value: value.to_string(),
    }
}

/// Blank input means "no coordinate" and maps to zero.
fn parse_coordinate(field: IncidentField, value: &str, limit: f64) -> Result<f64, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.abs() <= limit => Ok(parsed),
        _ => Err(invalid(field, value)),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitMode {
    Create { reporter: Option<User> },
    Edit { incident_id: String, editor: Option<User> },
}

impl SubmitMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, SubmitMode::Edit { .. })
    }

    /// `None` when the caller handles success itself.
    pub fn success_route(&self, incident: &Incident, has_callback: bool) -> Option<Route> {
        match self {
            SubmitMode::Edit { .. } if has_callback => None,
            _ => Some(Route::IncidentDetail(incident.id.clone())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("no signed-in user to attribute the report to")]
    Unauthenticated,
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct IncidentSubmitter<R> {
    repository: R,
    mode: SubmitMode,
    capabilities: Arc<CapabilityTable>,
}

impl<R: IncidentRepository> SubmitDelegate<IncidentDraft> for IncidentSubmitter<R> {
    type Output = Incident;
    type Error = SubmitError;

    async fn submit(&self, draft: &IncidentDraft) -> Result<Incident, SubmitError> {
        let report = draft.payload();
        match &self.mode {
            SubmitMode::Create { reporter } => {
                let reporter = reporter.as_ref().ok_or(SubmitError::Unauthenticated)?;
                self.capabilities
                    .authorize(Some(reporter.role), Capability::ReportIncident)?;

                let incident = self
                    .repository
                    .create(NewIncident {
                        report,
                        status: IncidentStatus::Reported,
                        reporter_id: reporter.id.clone(),
                        reporter_name: reporter.name.clone(),
                    })
                    .await?;
                info!(incident_id = %incident.id, reporter_id = %reporter.id, "incident reported");
                Ok(incident)
            }
            SubmitMode::Edit {
                incident_id,
                editor,
            } => {
                self.capabilities
                    .authorize(editor.as_ref().map(|u| u.role), Capability::EditIncident)?;

                let incident = self.repository.update(incident_id, report).await?;
                info!(incident_id = %incident.id, "incident updated");
                Ok(incident)
            }
        }
    }

    fn failure_notice(&self, error: &SubmitError) -> String {
        match error {
            SubmitError::Unauthenticated => "You must be logged in to report an incident".into(),
            SubmitError::Forbidden(_) if self.mode.is_edit() => {
                "You are not allowed to edit incidents".into()
            }
            SubmitError::Forbidden(_) => "You are not allowed to report incidents".into(),
            SubmitError::Repository(_) => "Failed to submit incident".into(),
        }
    }
}

/// Everything an incident form needs from outside.
pub struct IncidentServices<R, H> {
    pub repository: R,
    pub probe: GeolocationProbe<H>,
    pub hierarchy: Arc<LocationHierarchy>,
    pub capabilities: Arc<CapabilityTable>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error(transparent)]
    Busy(#[from] Busy),
}

/// Report form: create a new incident or edit an existing one.
pub struct IncidentDraftController<R, H> {
    form: DraftController<IncidentDraft, IncidentSubmitter<R>>,
    probe: GeolocationProbe<H>,
    locate_task: TaskHandle,
    detected: Option<GeoPosition>,
    terms_accepted: bool,
}

impl<R, H> IncidentDraftController<R, H>
where
    R: IncidentRepository,
    H: GeolocationHost,
{
    /// New report, attributed to `reporter`. Terms must be accepted first.
    pub fn create(reporter: Option<User>, services: IncidentServices<R, H>) -> Self {
        Self::new(
            IncidentDraft::default(),
            SubmitMode::Create { reporter },
            services,
        )
    }

    pub fn edit(incident: &Incident, editor: Option<User>, services: IncidentServices<R, H>) -> Self {
        Self::new(
            IncidentDraft::from_incident(incident),
            SubmitMode::Edit {
                incident_id: incident.id.clone(),
                editor,
            },
            services,
        )
    }

    fn new(draft: IncidentDraft, mode: SubmitMode, services: IncidentServices<R, H>) -> Self {
        let terms_accepted = mode.is_edit();
        let submitter = IncidentSubmitter {
            repository: services.repository,
            mode,
            capabilities: services.capabilities,
        };
        Self {
            form: DraftController::new(draft, services.hierarchy, submitter),
            probe: services.probe,
            locate_task: TaskHandle::new(),
            detected: None,
            terms_accepted,
        }
    }

    pub fn draft(&self) -> &IncidentDraft {
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

    pub fn mode(&self) -> &SubmitMode {
        &self.form.delegate().mode
    }

    pub fn is_busy(&self) -> bool {
        self.form.is_busy() || self.locate_task.is_pending()
    }

    pub fn is_locating(&self) -> bool {
        self.locate_task.is_pending()
    }

    pub fn submit_task(&self) -> TaskHandle {
        self.form.submit_task()
    }

    pub fn locate_task(&self) -> TaskHandle {
        self.locate_task.clone()
    }

    /// Last captured device position, for the map preview.
    pub fn detected_position(&self) -> Option<GeoPosition> {
        self.detected
    }

    pub fn needs_terms(&self) -> bool {
        !self.terms_accepted
    }

    pub fn accept_terms(&mut self) {
        self.terms_accepted = true;
    }

    pub fn municipalities(&self) -> Vec<&str> {
        self.form.context().municipalities().collect()
    }

    /// Barangay choices for the currently selected municipality.
    pub fn barangay_options(&self) -> &[String] {
        self.form
            .context()
            .barangays_of(&self.form.draft().location.municipality)
    }

    pub fn set_field(&mut self, field: IncidentField, value: &str) -> Result<(), DraftError> {
        self.form.set_field(field, value)?;
        if matches!(field, IncidentField::Latitude | IncidentField::Longitude) {
            self.form.clear_errors(&[LOCATION_KEY]);
        }
        Ok(())
    }

    pub fn set_field_by_key(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let field =
            IncidentField::from_key(key).ok_or_else(|| DraftError::UnknownField(key.to_string()))?;
        self.set_field(field, value)
    }

    /// Blank URLs are ignored. Returns whether an image was added.
    pub fn add_image(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        self.form.update(&[], |draft| draft.images.push(url.to_string()));
        true
    }

    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        if index >= self.form.draft().images.len() {
            return None;
        }
        let mut removed = None;
        self.form
            .update(&[], |draft| removed = Some(draft.images.remove(index)));
        removed
    }

    /// Captures the device position into the draft, replacing any
    /// coordinates typed in by hand.
    pub async fn detect_location(&mut self) -> Result<GeoPosition, LocateError> {
        let in_flight = self.locate_task.begin()?;

        match self.probe.capture().await {
            Ok(position) => {
                self.form.update(&[LOCATION_KEY], |draft| {
                    draft.location.latitude = position.latitude;
                    draft.location.longitude = position.longitude;
                });
                self.detected = Some(position);
                self.form
                    .post_notice(Notice::success("Location detected successfully"));
                in_flight.resolve();
                info!(?position, "location detected");
                Ok(position)
            }
            Err(err) => {
                warn!(error = %err, "location capture failed");
                let message = match err {
                    GeoError::Unsupported => "Geolocation is not supported on this device",
                    _ => "Failed to get your location. Please enter manually.",
                };
                self.form.post_notice(Notice::error(message));
                in_flight.reject();
                Err(err.into())
            }
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome<Incident> {
        if !self.terms_accepted {
            let notice = Notice::error("Please accept the terms before submitting a report");
            self.form.post_notice(notice.clone());
            return SubmitOutcome::Failed(notice);
        }
        self.form.submit().await
    }

    pub fn success_route(&self, incident: &Incident, has_callback: bool) -> Option<Route> {
        self.mode().success_route(incident, has_callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::FixedPosition;
    use crate::model::Role;
    use chrono::Utc;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryRepository {
        created: RefCell<Vec<NewIncident>>,
        updated: RefCell<Vec<(String, IncidentPayload)>>,
        fail: bool,
    }

    fn stored(id: &str, report: IncidentPayload) -> Incident {
        let now = Utc::now();
        Incident {
            id: id.to_string(),
            title: report.title,
            description: report.description,
            incident_type: report.incident_type,
            severity: report.severity,
            status: IncidentStatus::Reported,
            location: report.location,
            reporter_id: None,
            reporter_name: None,
            images: report.images,
            created_at: now,
            updated_at: now,
        }
    }

    impl IncidentRepository for MemoryRepository {
        async fn create(&self, incident: NewIncident) -> Result<Incident, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Storage("disk full".into()));
            }
            self.created.borrow_mut().push(incident.clone());
            Ok(stored("inc-1", incident.report))
        }

        async fn update(&self, id: &str, payload: IncidentPayload) -> Result<Incident, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::NotFound(id.to_string()));
            }
            self.updated.borrow_mut().push((id.to_string(), payload.clone()));
            Ok(stored(id, payload))
        }
    }

    fn user(role: Role) -> User {
        User {
            id: "u-7".into(),
            name: "Ana Reyes".into(),
            email: "ana@example.ph".into(),
            role,
            department: None,
            jurisdiction: None,
        }
    }

    fn services(
        repository: MemoryRepository,
        position: Option<GeoPosition>,
    ) -> IncidentServices<MemoryRepository, FixedPosition> {
        IncidentServices {
            repository,
            probe: GeolocationProbe::new(FixedPosition(position)),
            hierarchy: Arc::new(LocationHierarchy::builtin()),
            capabilities: Arc::new(CapabilityTable::standard()),
        }
    }

    fn fill(controller: &mut IncidentDraftController<MemoryRepository, FixedPosition>) {
        for (key, value) in [
            ("title", "Fire"),
            ("description", "House fire near the chapel"),
            ("purok", "3"),
            ("municipality", "Dauis"),
            ("barangay", "Totolan"),
            ("latitude", "9.62"),
            ("longitude", "123.87"),
        ] {
            controller.set_field_by_key(key, value).expect("set field");
        }
    }

    #[test]
    fn municipality_change_clears_barangay() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        controller.set_field(IncidentField::Municipality, "Panglao").expect("set");
        controller.set_field(IncidentField::Barangay, "Tawala").expect("set");
        assert_eq!(controller.draft().location.barangay, "Tawala");

        controller.set_field(IncidentField::Municipality, "Dauis").expect("set");
        assert_eq!(controller.draft().location.barangay, "");

        controller.set_field(IncidentField::Barangay, "Totolan").expect("set");
        controller.set_field(IncidentField::Municipality, "Dauis").expect("set");
        assert_eq!(controller.draft().location.barangay, "");
    }

    #[test]
    fn barangay_must_belong_to_municipality() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        controller.set_field(IncidentField::Municipality, "Panglao").expect("set");
        let err = controller
            .set_field(IncidentField::Barangay, "Totolan")
            .expect_err("not in Panglao");
        assert!(matches!(err, DraftError::NotAllowed { field: "barangay", .. }));
        assert_eq!(controller.draft().location.barangay, "");
        assert!(controller.barangay_options().iter().any(|b| b == "Doljo"));
    }

    #[test]
    fn coordinates_must_be_numbers_in_range() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        assert!(controller.set_field(IncidentField::Latitude, "north").is_err());
        assert!(controller.set_field(IncidentField::Latitude, "91").is_err());
        assert!(controller.set_field(IncidentField::Longitude, "inf").is_err());
        controller.set_field(IncidentField::Longitude, " 121.5 ").expect("set");
        assert_eq!(controller.draft().location.longitude, 121.5);
    }

    #[test]
    fn detected_location_overwrites_manual_entry() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), Some(GeoPosition::new(14.5, 121.0))),
        );
        controller.set_field(IncidentField::Latitude, "10").expect("set");
        controller.set_field(IncidentField::Longitude, "10").expect("set");

        let position = block_on(controller.detect_location()).expect("detect");
        assert_eq!(position, GeoPosition::new(14.5, 121.0));
        assert_eq!(controller.draft().location.latitude, 14.5);
        assert_eq!(controller.draft().location.longitude, 121.0);
        assert_eq!(controller.detected_position(), Some(position));
        assert_eq!(
            controller.notice().map(|n| n.message.as_str()),
            Some("Location detected successfully")
        );
    }

    #[test]
    fn failed_detection_leaves_draft_alone() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        controller.set_field(IncidentField::Latitude, "10").expect("set");

        let err = block_on(controller.detect_location()).expect_err("no position");
        assert_eq!(err, LocateError::Geo(GeoError::PositionUnavailable));
        assert_eq!(controller.draft().location.latitude, 10.0);
        assert_eq!(controller.detected_position(), None);
        assert_eq!(
            controller.notice().map(|n| n.message.as_str()),
            Some("Failed to get your location. Please enter manually.")
        );
        assert!(!controller.is_locating());
    }

    #[test]
    fn unsupported_device_gets_its_own_notice() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            IncidentServices {
                probe: GeolocationProbe::<FixedPosition>::unsupported(),
                ..services(MemoryRepository::default(), None)
            },
        );
        let err = block_on(controller.detect_location()).expect_err("unsupported");
        assert_eq!(err, LocateError::Geo(GeoError::Unsupported));
        assert_eq!(
            controller.notice().map(|n| n.message.as_str()),
            Some("Geolocation is not supported on this device")
        );
    }

    #[test]
    fn create_requires_accepted_terms() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        fill(&mut controller);
        assert!(controller.needs_terms());

        let outcome = block_on(controller.submit());
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(controller.form.delegate().repository.created.borrow().is_empty());
    }

    #[test]
    fn invalid_draft_makes_no_repository_call() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        controller.accept_terms();
        controller.set_field(IncidentField::Title, "Fire").expect("set");

        let SubmitOutcome::Invalid(errors) = block_on(controller.submit()) else {
            panic!("expected validation errors");
        };
        assert!(errors.contains("description"));
        assert!(errors.contains("location"));
        assert_eq!(controller.phase(), Phase::Editing);
        assert!(controller.form.delegate().repository.created.borrow().is_empty());
    }

    #[test]
    fn create_attaches_status_and_reporter() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        controller.accept_terms();
        fill(&mut controller);
        controller.add_image("  ");
        controller.add_image("https://img.example/1.jpg");

        let SubmitOutcome::Submitted(incident) = block_on(controller.submit()) else {
            panic!("expected submission");
        };
        assert_eq!(controller.phase(), Phase::Submitted);
        assert_eq!(
            controller.success_route(&incident, false),
            Some(Route::IncidentDetail("inc-1".into()))
        );

        let created = controller.form.delegate().repository.created.borrow();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].status, IncidentStatus::Reported);
        assert_eq!(created[0].reporter_id, "u-7");
        assert_eq!(created[0].reporter_name, "Ana Reyes");
        assert_eq!(
            created[0].report.images,
            Some(vec!["https://img.example/1.jpg".to_string()])
        );
    }

    #[test]
    fn create_without_user_is_refused() {
        let mut controller =
            IncidentDraftController::create(None, services(MemoryRepository::default(), None));
        controller.accept_terms();
        fill(&mut controller);

        let outcome = block_on(controller.submit());
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(Notice::error("You must be logged in to report an incident"))
        );
        assert_eq!(controller.draft().title, "Fire");
    }

    #[test]
    fn repository_failure_keeps_the_draft() {
        let repository = MemoryRepository {
            fail: true,
            ..MemoryRepository::default()
        };
        let mut controller =
            IncidentDraftController::create(Some(user(Role::Public)), services(repository, None));
        controller.accept_terms();
        fill(&mut controller);

        let outcome = block_on(controller.submit());
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(Notice::error("Failed to submit incident"))
        );
        assert_eq!(controller.phase(), Phase::Editing);
        assert_eq!(controller.draft().location.barangay, "Totolan");
    }

    #[test]
    fn edit_mode_updates_without_reporter_fields() {
        let existing = stored(
            "inc-9",
            IncidentPayload {
                title: "Flooded road".into(),
                description: "Knee-deep water".into(),
                incident_type: IncidentType::Flood,
                severity: Severity::High,
                location: Location {
                    purok: "2".into(),
                    barangay: "Looc".into(),
                    municipality: "Panglao".into(),
                    latitude: 9.58,
                    longitude: 123.75,
                },
                images: None,
            },
        );
        let mut controller = IncidentDraftController::edit(
            &existing,
            Some(user(Role::Responder)),
            services(MemoryRepository::default(), None),
        );
        assert!(!controller.needs_terms());
        controller.set_field(IncidentField::Severity, "critical").expect("set");

        let SubmitOutcome::Submitted(incident) = block_on(controller.submit()) else {
            panic!("expected submission");
        };
        assert_eq!(incident.severity, Severity::Critical);
        assert_eq!(controller.success_route(&incident, true), None);

        let updated = controller.form.delegate().repository.updated.borrow();
        assert_eq!(updated[0].0, "inc-9");
        assert_eq!(updated[0].1.images, None);
        assert!(controller.form.delegate().repository.created.borrow().is_empty());
    }

    #[test]
    fn public_user_may_not_edit() {
        let existing = stored(
            "inc-9",
            IncidentDraft {
                title: "Storm".into(),
                description: "Roof blown off".into(),
                location: Location {
                    purok: "1".into(),
                    barangay: "Bool".into(),
                    municipality: "Tagbilaran City".into(),
                    latitude: 9.65,
                    longitude: 123.85,
                },
                ..IncidentDraft::default()
            }
            .payload(),
        );
        let mut controller = IncidentDraftController::edit(
            &existing,
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );

        let outcome = block_on(controller.submit());
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(Notice::error("You are not allowed to edit incidents"))
        );
        assert!(controller.form.delegate().repository.updated.borrow().is_empty());
    }

    #[test]
    fn image_list_edits() {
        let mut controller = IncidentDraftController::create(
            Some(user(Role::Public)),
            services(MemoryRepository::default(), None),
        );
        assert!(controller.add_image("a.jpg"));
        assert!(controller.add_image("not a url"));
        assert_eq!(controller.remove_image(5), None);
        assert_eq!(controller.remove_image(0).as_deref(), Some("a.jpg"));
        assert_eq!(controller.draft().images, vec!["not a url".to_string()]);
    }
}
