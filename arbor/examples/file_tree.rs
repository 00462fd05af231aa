use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use std::time::Duration;

use arbor::prelude::*;
use arbor::LoadResponder;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use simplelog::{Config, LevelFilter, WriteLogger};

/// Answers queued by the loader, released on the next idle tick so the
/// loading placeholder is visible for a moment.
type Pending = Rc<RefCell<Vec<(String, LoadResponder)>>>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_file = File::create("file_tree.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let pending: Pending = Rc::default();
    let queue = Rc::clone(&pending);

    let mut tree = Tree::new(TreeConfig::new().checkbox()).with_loader(move |request: LoadRequest| {
        let path = request.id().unwrap_or_default().to_string();
        queue.borrow_mut().push((path, request.into_responder()));
    });

    tree.on(|notification| log::info!("{}", notification.name()));
    tree.attach(TerminalSurface::new()?)?;

    tree.batch();
    for name in ["src", "docs", "tests"] {
        tree.add_node(None, NodeData::new(name).with_id(name).unloaded())?;
    }
    tree.add_node(None, NodeData::new("Cargo.toml").with_id("Cargo.toml"))?;
    if let Some(first) = tree.first_visible() {
        tree.focus(first)?;
    }
    tree.end();

    loop {
        if !event::poll(Duration::from_millis(250))? {
            release(&pending);
            tree.process_loads();
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let Some(current) = tree.focused().or_else(|| tree.first_visible()) else {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                break;
            }
            continue;
        };

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(next) = tree.next_visible(current) {
                    tree.focus(next)?;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(previous) = tree.previous_visible(current) {
                    tree.focus(previous)?;
                }
            }
            KeyCode::Char(' ') => {
                tree.toggle_select(current)?;
            }
            KeyCode::Enter => {
                // The handle is only interesting to callers that await it.
                let _ = tree.toggle_collapse(current)?;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let _ = tree.expand(current)?;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if tree.node(current)?.collapsed() || !tree.node(current)?.has_children() {
                    if let Some(parent) = tree.node(current)?.parent() {
                        tree.focus(parent)?;
                    }
                } else {
                    tree.collapse(current)?;
                }
            }
            KeyCode::Char('x') => {
                tree.soft_remove(current)?;
            }
            KeyCode::Char('u') => {
                for key in tree.nodes_with(StateFlag::Removed) {
                    tree.restore(key)?;
                }
            }
            KeyCode::Char('s') => {
                tree.scroll_selected_into_view()?;
            }
            _ => {}
        }
    }

    let stats = tree.render_stats();
    log::info!(
        "rendered {} passes, rows built {} reused {}",
        stats.passes,
        stats.rows_built,
        stats.rows_reused
    );
    Ok(())
}

/// Resolve every queued load with a made up directory listing.
fn release(pending: &Pending) {
    for (path, responder) in pending.borrow_mut().drain(..) {
        responder.resolve(listing(&path));
    }
}

fn listing(path: &str) -> Vec<NodeData> {
    let depth = path.matches('/').count();
    let mut entries = Vec::new();
    if depth < 2 {
        for n in 1..=2 {
            let id = format!("{path}/dir{n}");
            entries.push(NodeData::new(format!("dir{n}")).with_id(id).unloaded());
        }
    }
    for n in 1..=3 {
        let id = format!("{path}/file{n}.rs");
        entries.push(NodeData::new(format!("file{n}.rs")).with_id(id));
    }
    entries
}
