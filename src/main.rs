//! Terminal lifecycle and the event loop.
//!
//! One mpsc channel feeds a single consumer: the input thread, the spinner
//! ticker, and the collaborator workers all post [`Event`]s into it, so all
//! state mutation happens on this thread, one event at a time.

use std::io;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use color_eyre::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

use modup::core::App;
use modup::gomod;
use modup::types::{Effect, Event, Module, Phase};
use modup::ui::ui;

/// Spinner animation cadence.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    color_eyre::install()?;

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal);

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    spawn_input(tx.clone());
    spawn_ticker(tx.clone());
    spawn_load(tx.clone());

    let mut app = App::new();
    let (width, height) = crossterm::terminal::size()?;
    app.update(Event::Resize(width, height));

    loop {
        terminal.draw(|frame| ui(frame, &app))?;

        let event = rx.recv()?;
        if let Some(Effect::Upgrade(module)) = app.update(event) {
            spawn_upgrade(tx.clone(), module);
        }

        match app.phase {
            Phase::Quitting => return Ok(()),
            Phase::Failed => {
                // Fatal whether or not a dataset was ever loaded; the
                // stored error is the process's exit reason.
                return match app.error.take() {
                    Some(err) => Err(err.into()),
                    None => Ok(()),
                };
            }
            _ => {}
        }
    }
}

/// Forward key presses and resizes until the consumer hangs up or the
/// terminal input stream fails.
fn spawn_input(tx: Sender<Event>) {
    thread::spawn(move || {
        loop {
            let forwarded = match event::read() {
                Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                Ok(TermEvent::Resize(width, height)) => Event::Resize(width, height),
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(forwarded).is_err() {
                break;
            }
        }
    });
}

fn spawn_ticker(tx: Sender<Event>) {
    thread::spawn(move || {
        while tx.send(Event::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
}

/// One-shot inventory load; posts exactly one completion event.
fn spawn_load(tx: Sender<Event>) {
    thread::spawn(move || {
        let completion = match gomod::list_outdated() {
            Ok(modules) => Event::Loaded(modules),
            Err(err) => Event::Failed(err.into()),
        };
        tx.send(completion).ok();
    });
}

/// One upgrade followed by a fresh inventory snapshot; posts exactly one
/// completion event.
fn spawn_upgrade(tx: Sender<Event>, module: Module) {
    thread::spawn(move || {
        let completion = match gomod::upgrade(&module) {
            Ok(modules) => Event::Upgraded(modules),
            Err(err) => Event::Failed(err.into()),
        };
        tx.send(completion).ok();
    });
}
