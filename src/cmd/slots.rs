//! Slot editor: `cfp-scheduler slots`.
//!
//! Each invocation loads the track, applies one edit, and saves, so the
//! backend always holds what was last shown.

use anyhow::{Result, bail};
use cfp_scheduler::config::Config;
use cfp_scheduler::controllers::SlotEditor;
use cfp_scheduler::events::{DropEvent, EventBus};
use cfp_scheduler::models::{Talk, TalkId};
use cfp_scheduler::routes::Route;
use console::style;

use super::super::SlotsCommands;
use super::{client, print_flash};

pub async fn cmd_slots(config: &Config, command: SlotsCommands) -> Result<()> {
    let track = match &command {
        SlotsCommands::Show { track }
        | SlotsCommands::Assign { track, .. }
        | SlotsCommands::Unassign { track, .. }
        | SlotsCommands::Stadium { track, .. }
        | SlotsCommands::Publish { track }
        | SlotsCommands::Unlock { track } => resolve_track(track)?,
    };

    let mut editor = SlotEditor::new(client(config)?, track);
    let loaded = editor.load().await;
    print_flash(editor.flash_mut());
    loaded?;

    let result = match command {
        SlotsCommands::Show { .. } => {
            print_editor(&editor);
            Ok(())
        }
        SlotsCommands::Assign { talk, slot, .. } => {
            let Some(dragged) = find_talk(&editor, &TalkId(talk.clone())) else {
                bail!("Talk {} is not an approved talk of this track", talk);
            };
            editor.check_editable()?;
            let bus = EventBus::default();
            let mut rx = bus.subscribe();
            bus.publish(DropEvent::new(dragged, slot.clone()));
            if editor.apply_pending_drops(&mut rx) == 0 {
                bail!("Slot {} not found", slot);
            }
            editor.save_allocation().await
        }
        SlotsCommands::Unassign { slot, position, .. } => {
            let talk = editor.deallocate(&slot, position)?;
            println!("Removed {} from slot {}", describe(&talk), slot);
            editor.save_allocation().await
        }
        SlotsCommands::Stadium { slot, .. } => {
            editor.toggle_stadium(&slot)?;
            editor.save_allocation().await
        }
        SlotsCommands::Publish { .. } => editor.request_publication().await,
        SlotsCommands::Unlock { .. } => editor.request_unlocking().await,
    };

    print_flash(editor.flash_mut());
    result?;
    Ok(())
}

/// Accept either a bare track id or an app path such as `/slots/java`.
fn resolve_track(arg: &str) -> Result<String> {
    if !arg.starts_with('/') {
        return Ok(arg.to_string());
    }
    match Route::parse(arg).track_id() {
        Some(id) => Ok(id.to_string()),
        None => bail!("{} does not name a track (expected /slots/<id>)", arg),
    }
}

/// Look a talk up among unassigned talks first, then in slots.
fn find_talk(editor: &SlotEditor, id: &TalkId) -> Option<Talk> {
    editor
        .approved_talks()
        .into_iter()
        .flatten()
        .chain(editor.slots().into_iter().flatten().flat_map(|s| s.proposals.iter()))
        .find(|t| &t.id == id)
        .cloned()
}

fn describe(talk: &Talk) -> String {
    match talk.title() {
        Some(title) => format!("#{} {}", talk.id, title),
        None => format!("#{}", talk.id),
    }
}

fn print_editor(editor: &SlotEditor) {
    println!();
    println!(
        "Track {}{}",
        style(editor.track_id()).bold(),
        if editor.blocked() {
            style(" (blocked)").red().to_string()
        } else {
            String::new()
        }
    );
    println!();

    for slot in editor.slots().unwrap_or_default() {
        let marker = if slot.stadium { " [stadium]" } else { "" };
        println!("Slot {}{}", style(&slot.id).cyan(), marker);
        if slot.proposals.is_empty() {
            println!("    (empty)");
        }
        for (position, talk) in slot.proposals.iter().enumerate() {
            println!("    {}. {}", position, describe(talk));
        }
    }

    println!();
    println!("Unassigned:");
    let approved = editor.approved_talks().unwrap_or_default();
    if approved.is_empty() {
        println!("    (none)");
    }
    for talk in approved {
        println!("    {}", describe(talk));
    }
}
