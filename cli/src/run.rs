//! Execute the units of a script file in order

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use spotlend::{Event, Outcome};
use std::path::Path;

use crate::script::Script;
use crate::session::Session;

#[derive(Serialize)]
struct UnitReport {
    name: String,
    committed: bool,
    outcomes: Vec<Outcome>,
    error: Option<String>,
}

#[derive(Serialize)]
struct RunReport {
    units: Vec<UnitReport>,
    events: Vec<Event>,
}

/// A failed unit is rolled back and reported; later units still run
pub fn run_script(session: &mut Session, path: &Path) -> Result<()> {
    let script = Script::load(path)?;
    let units = script.compile(&session.config)?;
    let journal_start = session.market.events().len();
    let mut reports = Vec::with_capacity(units.len());

    session.header("Script");
    for (name, unit) in units {
        let report = match session.market.execute(&unit) {
            Ok(outcomes) => {
                if !session.json {
                    println!("{} {} ({} ops)", "✓".bright_green(), name, unit.len());
                }
                UnitReport {
                    name,
                    committed: true,
                    outcomes,
                    error: None,
                }
            }
            Err(err) => {
                if !session.json {
                    println!("{} {}: {}", "✗".bright_red(), name, err);
                }
                UnitReport {
                    name,
                    committed: false,
                    outcomes: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        reports.push(report);
    }

    let events = session.market.events()[journal_start..].to_vec();
    session.header("Events");
    for event in &events {
        session.note(format!("{:?}", event));
    }

    session.emit(&RunReport {
        units: reports,
        events,
    })
}
