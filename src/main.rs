use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tocata::backend::RodioBackend;
use tocata::config::Settings;
use tocata::controller::format_time;
use tocata::{PlayerController, Result};

fn load_settings() -> Settings {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("could not load configuration ({e}), using defaults");
            Settings::default()
        }
    };
    if let Err(e) = settings.validate() {
        eprintln!("invalid configuration ({e}), using defaults");
        return Settings::default();
    }
    settings
}

fn main() -> Result<()> {
    env_logger::init();

    let settings = load_settings();
    let backend = RodioBackend::open_default()?;
    let codec = RodioBackend::codec_support();
    let mut player = PlayerController::new(backend, codec, &settings);

    for dir in std::env::args().skip(1) {
        match player.add_directory(Path::new(&dir)) {
            Ok(status) => println!("{status}"),
            Err(e) => eprintln!("{e}"),
        }
    }

    // Reader thread feeds lines into the channel so the main loop can keep
    // pumping watcher events between commands.
    let (lines_tx, lines_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if lines_tx.send(line).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            }
        }
    });

    println!("tocata: type `help` for commands");
    prompt();

    loop {
        if let Some(status) = player.process_events() {
            println!("\n{status}");
            prompt();
        }

        let line = match lines_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            prompt();
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        if command == "quit" || command == "exit" {
            let _ = player.stop();
            break;
        }

        match dispatch(&mut player, command, &rest) {
            Ok(status) => println!("{status}"),
            Err(e) => eprintln!("{e}"),
        }
        prompt();
    }

    Ok(())
}

fn dispatch(player: &mut PlayerController<RodioBackend>, command: &str, args: &[&str]) -> Result<String> {
    match command {
        "add" => match args {
            [path] if Path::new(path).is_dir() => player.add_directory(Path::new(path)),
            [path] => player.add_track(Path::new(path)),
            [path, pos] => match pos.parse::<usize>() {
                Ok(pos) if pos > 0 => player.insert_track(Path::new(path), pos - 1),
                _ => Ok("usage: add <file> [position]".to_string()),
            },
            _ => Ok("usage: add <file|dir> [position]".to_string()),
        },
        "ls" | "list" => {
            let entries = player.entries();
            if entries.is_empty() {
                return Ok("playlist is empty".to_string());
            }
            let current = player.current_index();
            let mut out = String::new();
            for (n, name) in entries {
                let marker = if current == Some(n - 1) { ">" } else { " " };
                out.push_str(&format!("{marker} {n}. {name}\n"));
            }
            out.pop();
            Ok(out)
        }
        "play" => match one_number(args) {
            Some(n) => player.play_selected(n - 1),
            None => player.play_selected(player.current_index().unwrap_or(0)),
        },
        "pause" => player.pause(),
        "resume" => player.resume(),
        "stop" => player.stop(),
        "next" => player.next(),
        "prev" | "previous" => player.previous(),
        "repeat" => player.toggle_repeat(),
        "shuffle" => player.toggle_shuffle(),
        "rm" | "remove" => match one_number(args) {
            Some(n) => player.remove_track(n - 1),
            None => Ok("usage: rm <track number>".to_string()),
        },
        "mv" | "move" => match args {
            [from, to] => match (from.parse::<usize>(), to.parse::<usize>()) {
                (Ok(f), Ok(t)) if f > 0 && t > 0 => player.move_track(f - 1, t - 1),
                _ => Ok("usage: mv <from> <to>".to_string()),
            },
            _ => Ok("usage: mv <from> <to>".to_string()),
        },
        "up" => match one_number(args) {
            Some(n) => player.move_up(n - 1),
            None => Ok("usage: up <track number>".to_string()),
        },
        "down" => match one_number(args) {
            Some(n) => player.move_down(n - 1),
            None => Ok("usage: down <track number>".to_string()),
        },
        "clear" => player.clear(),
        "seek" => match args.first().and_then(|s| s.trim_end_matches('%').parse::<u8>().ok()) {
            Some(p) => player.seek_percent(p),
            None => Ok("usage: seek <percent>".to_string()),
        },
        "vol" | "volume" => match args.first().and_then(|s| s.parse::<u8>().ok()) {
            Some(p) => player.set_volume(p),
            None => Ok("usage: vol <0-100>".to_string()),
        },
        "status" => Ok(status_line(player)),
        "help" => Ok(HELP.to_string()),
        other => Ok(format!("unknown command `{other}`, try `help`")),
    }
}

fn one_number(args: &[&str]) -> Option<usize> {
    args.first().and_then(|s| s.parse::<usize>().ok()).filter(|&n| n > 0)
}

fn status_line(player: &PlayerController<RodioBackend>) -> String {
    let transport = match player.current_index() {
        Some(index) if player.is_playing() => format!(
            "playing track {} at {} / {}",
            index + 1,
            format_time(player.position()),
            format_time(player.duration())
        ),
        Some(index) => format!(
            "paused on track {} at {}",
            index + 1,
            format_time(player.position())
        ),
        None => "stopped".to_string(),
    };
    format!(
        "{transport} | {} tracks | {} | shuffle {}",
        player.track_count(),
        player.repeat_mode().label(),
        if player.shuffle_enabled() { "on" } else { "off" }
    )
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

const HELP: &str = "\
add <file|dir> [pos]  add a track (or every track under a directory)
ls                    show the playlist
play [n]              play track n (or the current one)
pause / resume / stop transport control
next / prev           skip between tracks
repeat                cycle no repeat -> repeat all -> repeat one
shuffle               toggle shuffle
rm <n>                remove track n
mv <from> <to>        move a track
up <n> / down <n>     nudge a track by one position
seek <percent>        jump within the current track
vol <0-100>           set the volume
clear                 empty the playlist
status                show transport and playlist state
quit                  exit";
