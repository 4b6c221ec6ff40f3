//! Line-oriented hunt session loop.
//!
//! A simple protocol suitable for piping a walk through the program:
//! - `<lat> <lng>` feeds a position update
//! - lines starting with `#` are commands (status, spots, reset, quit)
//! - completion notifications are printed as they fire

use hunt_core::geo::Coordinate;
use hunt_core::story::SpotDefinition;
use hunt_core::{HuntSession, Notifier};
use std::io::{self, BufRead, Write};

/// Notifier that prints one line per completed spot.
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn spot_completed(&mut self, spot: &SpotDefinition) {
        println!("[FOUND] You reached '{}'!", spot.id);
        if let Some(hint) = spot.custom.as_ref().and_then(|c| c.get("hint")).and_then(|h| h.as_str()) {
            println!("        {hint}");
        }
    }
}

/// Run the session loop until stdin closes or the user quits.
pub fn run(mut session: HuntSession) -> io::Result<()> {
    println!("=== {} ===", session.hunt_name());
    println!(
        "Spots: {} ({} already completed)",
        session.registry().len(),
        session.completed_ids().len()
    );
    if let Some((south_west, north_east)) = session.registry().bounding_box() {
        println!("Area: {south_west} to {north_east}");
    }
    println!();
    println!("Enter positions as '<lat> <lng>', or #help for commands.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            if !handle_command(&mut session, command) {
                break;
            }
            stdout.flush().ok();
            continue;
        }

        match parse_position(line) {
            Some(position) => {
                let completed = session.on_user_position(position);
                if completed.is_empty() {
                    println!(
                        "[OK] Nothing here. {} spot(s) still pending.",
                        session.pending_ids().len()
                    );
                }
                if session.is_complete() {
                    println!("[DONE] Hunt complete, every spot found!");
                }
            }
            None => {
                println!("[ERROR] Expected '<lat> <lng>', got: {line}");
            }
        }
        stdout.flush().ok();
    }

    Ok(())
}

/// Handle a `#` command. Returns false when the loop should stop.
fn handle_command(session: &mut HuntSession, command: &str) -> bool {
    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts.first().copied() {
        Some("quit") | Some("exit") => {
            println!("Goodbye!");
            return false;
        }
        Some("status") => {
            println!("[STATUS]");
            println!("  Hunt: {}", session.hunt_name());
            println!("  Completed: {}", format_ids(&session.completed_ids()));
            println!("  Pending: {}", format_ids(&session.pending_ids()));
            match session.last_position() {
                Some(position) => println!("  Last position: {position}"),
                None => println!("  Last position: none yet"),
            }
        }
        Some("spots") => match session.last_position() {
            Some(position) => {
                println!("[SPOTS]");
                for (id, meters) in session.distances_from(position) {
                    let state = if session.registry().is_pending(&id) {
                        "pending"
                    } else {
                        "completed"
                    };
                    println!("  {id}: {meters:.1} m away ({state})");
                }
            }
            None => println!("[ERROR] No position yet. Enter '<lat> <lng>' first."),
        },
        Some("reset") => {
            session.reset_progress();
            println!("[RESET] Progress cleared, every spot is pending again.");
        }
        Some("save") => {
            session.save();
            println!("[SAVED] Progress written.");
        }
        Some("help") => {
            println!("[HELP]");
            println!("  <lat> <lng>  - Feed a position update");
            println!("  #status      - Show completed and pending spots");
            println!("  #spots       - Show distance to every spot");
            println!("  #reset       - Clear saved progress");
            println!("  #save        - Persist progress now");
            println!("  #quit        - Exit");
        }
        _ => {
            println!("[ERROR] Unknown command. Type #help for help.");
        }
    }
    true
}

/// Parse a `<lat> <lng>` pair into a coordinate.
fn parse_position(line: &str) -> Option<Coordinate> {
    let mut parts = line.split_whitespace();
    let lat = parts.next()?.parse::<f64>().ok()?;
    let lng = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let position = Coordinate::new(lat, lng);
    position.is_valid().then_some(position)
}

fn format_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        ids.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        let position = parse_position("45.0 2.0").unwrap();
        assert_eq!(position.lat, 45.0);
        assert_eq!(position.lng, 2.0);

        assert!(parse_position("45.0").is_none());
        assert!(parse_position("45.0 2.0 7.0").is_none());
        assert!(parse_position("north east").is_none());
        assert!(parse_position("91.0 2.0").is_none());
    }

    #[test]
    fn test_format_ids() {
        assert_eq!(format_ids(&[]), "(none)");
        assert_eq!(
            format_ids(&["a".to_string(), "b".to_string()]),
            "a, b"
        );
    }
}
