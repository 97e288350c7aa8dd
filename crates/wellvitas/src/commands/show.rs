//! Implementation of the `wellvitas show` command

use std::path::Path;

use owo_colors::OwoColorize;
use wellvitas_core::build_summary_message;
use wellvitas_core::storage::Snapshot;
use wellvitas_core::wizard::stage_heading;

use super::{OutputMode, open_session, report_error};
use crate::output::{JsonResponse, ShowData};

/// Print the saved booking's summary
pub fn run_show(config_path: Option<&Path>, mode: OutputMode) -> Result<i32, String> {
    let session = match open_session(config_path) {
        Ok(session) => session,
        Err(e) => return Ok(report_error("show", mode, &e)),
    };

    let Some(snapshot) = session.store.load() else {
        if mode.json {
            JsonResponse::<Option<ShowData>>::ok("show", None).print();
        } else if !mode.quiet {
            println!("No saved booking");
        }
        return Ok(0);
    };

    let data = show_data(snapshot);
    if mode.json {
        JsonResponse::ok("show", Some(data)).print();
    } else if !mode.quiet {
        println!("{}", data.stage.bold());
        if let Some(saved_at) = &data.saved_at {
            println!("{}", format!("Saved {}", saved_at).dimmed());
        }
        println!();
        println!("{}", data.message);
        println!();
        println!("Price: {}", data.price);
    }
    Ok(0)
}

fn show_data(snapshot: Snapshot) -> ShowData {
    let saved_at = snapshot.saved_at.clone();
    let state = snapshot.into_state();
    ShowData {
        stage: stage_heading(state.stage),
        message: build_summary_message(&state),
        price: state.programme.price_label(),
        saved_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellvitas_core::storage::parse_snapshot;

    #[test]
    fn test_show_data_from_snapshot() {
        let snapshot = parse_snapshot(
            r#"{"stage":3,"enquiry":{"name":"Jane"},"programme":{"package":"12","payment":"plan"},"savedAt":"2026-10-19T10:00:00Z"}"#,
        )
        .unwrap();
        let data = show_data(snapshot);
        assert!(data.stage.starts_with("Step 4 of 5"));
        assert!(data.message.contains("Name: Jane"));
        assert_eq!(data.price, "£450 • monthly plan available");
        assert_eq!(data.saved_at.as_deref(), Some("2026-10-19T10:00:00Z"));
    }
}
