//! Opcode handlers
//!
//! One function per screen command. Queries answer from the latest
//! snapshot; setters go straight to the printer and never touch the
//! snapshot, the next poll brings the new values.

use klcd_protocol::{ArgKind, Axis, Handle, Notification, Opcode, ParsedArg, Reply};

use super::error::{HandlerError, RegistryError};
use super::registry::{Handler, Registry};
use super::session::Session;
use crate::config::Preset;
use crate::files::Selection;
use crate::state::{format_elapsed, round_to_int, PrintState, PrinterSnapshot};

/// The full opcode table
const OPCODES: &[(u16, ArgKind, Handler)] = &[
    (0, ArgKind::None, hotend_temp),
    (1, ArgKind::None, hotend_target),
    (2, ArgKind::None, bed_temp),
    (3, ArgKind::None, bed_target),
    (4, ArgKind::None, fan_speed),
    (5, ArgKind::None, position),
    (6, ArgKind::None, progress),
    (7, ArgKind::None, print_time),
    (8, ArgKind::Numeric, file_list),
    (9, ArgKind::None, pause_print),
    (10, ArgKind::None, resume_print),
    (11, ArgKind::None, stop_print),
    (12, ArgKind::None, stop_print),
    (13, ArgKind::Token, select_entry),
    (14, ArgKind::None, start_print),
    (15, ArgKind::None, resume_print),
    (16, ArgKind::Numeric, set_hotend_target),
    (17, ArgKind::Numeric, set_bed_target),
    (18, ArgKind::Numeric, set_fan_speed),
    (19, ArgKind::None, motors_off),
    (20, ArgKind::Numeric, feed_rate),
    (21, ArgKind::BareWord, home),
    (22, ArgKind::AxisMove, move_axis),
    (23, ArgKind::None, preheat_pla),
    (24, ArgKind::None, preheat_abs),
    (25, ArgKind::None, cool_down),
    (26, ArgKind::None, refresh_list),
    (33, ArgKind::None, version_info),
];

/// Build a registry with every supported opcode
pub fn default_registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    for &(number, kind, handler) in OPCODES {
        registry.register(Opcode(number), kind, handler)?;
    }
    Ok(registry)
}

type Field = fn(&PrinterSnapshot) -> Option<f32>;

fn reading(s: &Session<'_>, field: Field) -> i32 {
    round_to_int(s.state.sync.value(field))
}

fn numeric(arg: ParsedArg) -> Result<u32, HandlerError> {
    match arg {
        ParsedArg::Numeric(value) => Ok(value),
        _ => Err(HandlerError::MissingArgument),
    }
}

/// Refuse while a print job is in progress or a safety fault is active
///
/// A fault overrides the effective state with `Error`, so the reported
/// state is checked as well to catch a job that keeps running.
fn refuse_while_printing(s: &Session<'_>) -> Result<(), HandlerError> {
    let effective = s.state.sync.state();
    let reported = s.state.sync.reported_state();
    if reported.is_active() {
        return Err(HandlerError::Refused(reported));
    }
    if effective == PrintState::Error {
        return Err(HandlerError::Refused(effective));
    }
    Ok(())
}

// A0: the screen polls this from its main page, so the file menu starts
// over from the root next time it is opened
fn hotend_temp(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    s.state.browser.reset();
    let value = reading(s, |p| p.hotend);
    s.out.reply(Reply::HotendTemp(value))?;
    Ok(())
}

fn hotend_target(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let value = reading(s, |p| p.hotend_target);
    s.out.reply(Reply::HotendTarget(value))?;
    Ok(())
}

fn bed_temp(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let value = reading(s, |p| p.bed);
    s.out.reply(Reply::BedTemp(value))?;
    Ok(())
}

fn bed_target(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let value = reading(s, |p| p.bed_target);
    s.out.reply(Reply::BedTarget(value))?;
    Ok(())
}

fn fan_speed(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let value = reading(s, |p| p.fan);
    s.out.reply(Reply::FanSpeed(value))?;
    Ok(())
}

fn position(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let sync = &s.state.sync;
    let reply = Reply::Position {
        x: sync.value(|p| p.x),
        y: sync.value(|p| p.y),
        z: sync.value(|p| p.z),
    };
    s.out.reply(reply)?;
    Ok(())
}

fn progress(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let value = reading(s, |p| p.progress);
    s.out.reply(Reply::Progress(value))?;
    Ok(())
}

fn print_time(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let seconds = s.state.sync.value(|p| p.print_duration);
    let (hours, minutes) = format_elapsed(seconds);
    s.out.reply(Reply::PrintTime { hours, minutes })?;
    Ok(())
}

fn file_list(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    let offset = match arg {
        ParsedArg::Numeric(offset) => offset as usize,
        _ => 0,
    };
    s.refresh_files()?;
    s.send_page(offset)
}

// Job control follows the backend's own state, so a job can still be
// paused or resumed while a fault overlay is up
fn pause_print(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let state = s.state.sync.reported_state();
    if state != PrintState::Printing {
        return Err(HandlerError::Refused(state));
    }
    s.printer.pause()?;
    Ok(())
}

fn resume_print(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let state = s.state.sync.reported_state();
    if !state.can_resume() {
        return Err(HandlerError::Refused(state));
    }
    s.printer.resume()?;
    Ok(())
}

fn stop_print(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    s.printer.cancel()?;
    Ok(())
}

fn select_entry(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    let ParsedArg::Token(text) = arg else {
        return Err(HandlerError::MissingArgument);
    };
    let handle = Handle::parse(&text)?;

    if !s.state.browser.has_tree() {
        s.refresh_files()?;
    }

    match s.state.browser.select(handle)? {
        Selection::Navigated => {
            s.send_page(0)?;
            s.out.notify(Notification::ListRefreshed)?;
        }
        Selection::FileSelected => s.out.notify(Notification::FileOpened)?,
        Selection::Ignored => {}
    }
    Ok(())
}

fn start_print(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    refuse_while_printing(s)?;
    let path = s
        .state
        .browser
        .selected()
        .ok_or(HandlerError::NoFileSelected)?;
    s.printer.start_print(path)?;
    Ok(())
}

fn set_hotend_target(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    s.printer.set_hotend_target(numeric(arg)?)?;
    Ok(())
}

fn set_bed_target(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    s.printer.set_bed_target(numeric(arg)?)?;
    Ok(())
}

fn set_fan_speed(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    s.printer.set_fan_speed(numeric(arg)?)?;
    Ok(())
}

fn motors_off(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    refuse_while_printing(s)?;
    s.printer.disable_motors()?;
    Ok(())
}

fn feed_rate(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    match arg {
        ParsedArg::Numeric(percent) => s.printer.set_feed_rate(percent)?,
        _ => {
            let value = reading(s, |p| p.feed_rate);
            s.out.reply(Reply::FeedRate(value))?;
        }
    }
    Ok(())
}

fn home(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    refuse_while_printing(s)?;
    let axis = match arg {
        ParsedArg::BareWord(word) if word.eq_ignore_ascii_case("C") => None,
        ParsedArg::BareWord(word) => match word.as_bytes() {
            [letter] => Some(
                Axis::from_byte(letter.to_ascii_uppercase()).ok_or(HandlerError::InvalidAxis)?,
            ),
            _ => return Err(HandlerError::InvalidAxis),
        },
        _ => None,
    };
    s.printer.home(axis)?;
    Ok(())
}

fn move_axis(s: &mut Session<'_>, arg: ParsedArg) -> Result<(), HandlerError> {
    refuse_while_printing(s)?;
    let ParsedArg::AxisMove(movement) = arg else {
        return Err(HandlerError::MissingArgument);
    };
    s.printer.move_relative(movement)?;
    Ok(())
}

fn preheat(s: &mut Session<'_>, preset: Preset) -> Result<(), HandlerError> {
    refuse_while_printing(s)?;
    s.printer.set_hotend_target(preset.hotend)?;
    s.printer.set_bed_target(preset.bed)?;
    Ok(())
}

fn preheat_pla(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let preset = s.state.settings.presets.pla;
    preheat(s, preset)
}

fn preheat_abs(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    let preset = s.state.settings.presets.abs;
    preheat(s, preset)
}

fn cool_down(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    preheat(s, Preset { hotend: 0, bed: 0 })?;
    s.out.notify(Notification::Ready)?;
    Ok(())
}

fn refresh_list(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    s.refresh_files()?;
    s.send_page(0)?;
    s.out.notify(Notification::ListRefreshed)?;
    Ok(())
}

fn version_info(s: &mut Session<'_>, _: ParsedArg) -> Result<(), HandlerError> {
    s.out.notify(Notification::BuildVersion)?;
    s.out
        .reply(Reply::Text(&s.state.settings.display.build_version))?;
    Ok(())
}
