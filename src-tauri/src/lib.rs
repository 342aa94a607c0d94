pub mod commands;
pub mod runtime;
pub mod state;

use crate::runtime::{EventSink, NoopSink};
use crate::state::AppState;
use resq_core::capability::CapabilityTable;
use resq_core::config::ResqConfig;
use resq_core::model::{
    IncidentPayload, IncidentStatus, IncidentType, Location, NewIncident, Severity,
};
use resq_core::navigation::standard_menu;
use resq_core::store::SqliteStore;
use std::sync::Arc;
#[cfg(feature = "tauri-app")]
use tauri::Manager;
use tracing::info;

pub fn build_state(config: ResqConfig, sink: Arc<dyn EventSink>) -> Result<AppState, String> {
    let hierarchy = config.load_hierarchy().map_err(|e| e.to_string())?;
    let store = SqliteStore::open(&config.db_path, &config.admin_code).map_err(|e| e.to_string())?;
    info!(db = %config.db_path.display(), policy = ?config.policy, "backend ready");

    Ok(AppState {
        store: Arc::new(store),
        config: Arc::new(config),
        hierarchy: Arc::new(hierarchy),
        capabilities: Arc::new(CapabilityTable::standard()),
        menu: Arc::new(standard_menu()),
        sink,
    })
}

/// Headless start: opens the store and prints what the UI would load first.
pub fn run() -> Result<(), String> {
    let config = ResqConfig::from_env().map_err(|e| e.to_string())?;
    let state = build_state(config, Arc::new(NoopSink))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&overview(&state)?).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn overview(state: &AppState) -> Result<serde_json::Value, String> {
    Ok(serde_json::json!({
        "municipalities": commands::list_municipalities(state),
        "menu": commands::visible_menu(state),
        "incidentCount": commands::list_incidents(state)?.len(),
    }))
}

#[cfg(feature = "tauri-app")]
pub fn run_tauri() {
    tauri::Builder::default()
        .setup(|app| {
            let config = ResqConfig::from_env()?;
            let sink = Arc::new(runtime::TauriSink::new(app.handle()));
            let state = build_state(config, sink).map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

            if state.store.list_incidents()?.is_empty() {
                seed_demo_data(&state).map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;
            }

            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::list_municipalities_cmd,
            commands::list_barangays_cmd,
            commands::validate_incident_cmd,
            commands::submit_incident_cmd,
            commands::detect_location_cmd,
            commands::validate_account_cmd,
            commands::register_account_cmd,
            commands::current_user_cmd,
            commands::visible_menu_cmd,
            commands::active_paths_cmd,
            commands::list_incidents_cmd
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

pub fn run_demo() -> Result<(), String> {
    let config = ResqConfig::from_env().map_err(|e| e.to_string())?;
    let state = build_state(config, Arc::new(NoopSink))?;
    seed_demo_data(&state)?;

    let registered = commands::register_account(
        &state,
        serde_json::from_value(serde_json::json!({
            "name": "Demo Responder",
            "email": format!("responder-{}@example.ph", std::process::id()),
            "password": "responder1",
            "confirmPassword": "responder1",
            "role": "responder",
            "department": "CDRRMO",
            "jurisdiction": "Tagbilaran City",
        }))
        .map_err(|e| e.to_string())?,
    )?;
    println!(
        "registration:\n{}",
        serde_json::to_string_pretty(&registered).map_err(|e| e.to_string())?
    );

    let menu = commands::visible_menu(&state);
    println!(
        "menu:\n{}",
        serde_json::to_string_pretty(&menu).map_err(|e| e.to_string())?
    );

    let incidents = commands::list_incidents(&state)?;
    println!(
        "incidents:\n{}",
        serde_json::to_string_pretty(&incidents).map_err(|e| e.to_string())?
    );

    Ok(())
}

fn seed_demo_data(state: &AppState) -> Result<(), String> {
    let reports = [
        (
            "Fire near the public market",
            "Smoke coming from a row of stalls",
            IncidentType::Fire,
            Severity::High,
            Location {
                purok: "2".into(),
                barangay: "Cogon".into(),
                municipality: "Tagbilaran City".into(),
                latitude: 9.6496,
                longitude: 123.8547,
            },
        ),
        (
            "Flooded coastal road",
            "Knee-deep water after high tide",
            IncidentType::Flood,
            Severity::Medium,
            Location {
                purok: "5".into(),
                barangay: "Tawala".into(),
                municipality: "Panglao".into(),
                latitude: 9.5721,
                longitude: 123.7794,
            },
        ),
    ];

    for (title, description, incident_type, severity, location) in reports {
        state
            .store
            .insert_incident(NewIncident {
                report: IncidentPayload {
                    title: title.into(),
                    description: description.into(),
                    incident_type,
                    severity,
                    location,
                    images: None,
                },
                status: IncidentStatus::Reported,
                reporter_id: "demo".into(),
                reporter_name: "Demo Reporter".into(),
            })
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn test_state(name: &str, sink: Arc<dyn EventSink>) -> AppState {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let config = ResqConfig {
        db_path: format!("/tmp/resq-tests/{name}-{nanos}.db").into(),
        ..ResqConfig::default()
    };
    build_state(config, sink).expect("state")
}
