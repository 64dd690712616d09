//! `speakers`: one-shot login + fetch against the device.

use serde::Serialize;
use tabled::Tabled;

use ccsbridge_core::{DeviceClient, SpeakerRecord, main_speaker};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

/// A speaker list entry with the derived main-speaker mark.
#[derive(Debug, Serialize)]
struct SpeakerView {
    id: u32,
    name: String,
    priority: bool,
    main: bool,
}

#[derive(Tabled)]
struct SpeakerRow {
    #[tabled(rename = "Mic")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Main")]
    main: &'static str,
}

fn mark(flag: bool) -> &'static str {
    if flag { "*" } else { "" }
}

fn to_row(s: &SpeakerView) -> SpeakerRow {
    SpeakerRow {
        id: s.id,
        name: s.name.clone(),
        priority: mark(s.priority),
        main: mark(s.main),
    }
}

fn views(records: Vec<SpeakerRecord>) -> Vec<SpeakerView> {
    let main = main_speaker(&records).map(|s| s.id);
    records
        .into_iter()
        .map(|r| SpeakerView {
            main: Some(r.id) == main,
            id: r.id,
            name: r.name,
            priority: r.priority,
        })
        .collect()
}

pub async fn handle(resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let Resolved {
        profile_name,
        bridge: config,
        transport,
    } = resolved;
    config.validate()?;

    tracing::debug!(profile = %profile_name, host = %config.host, "fetching speakers");
    let client = DeviceClient::new(&config.host, &transport)?;
    let token = client.login(&config.username, &config.password).await?;
    let speakers = client.list_speakers(&token).await?;

    let views = views(speakers.into_iter().map(SpeakerRecord::from).collect());
    let out = output::render_list(global.output, &views, to_row, |s| s.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
