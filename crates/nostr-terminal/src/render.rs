//! Screen output: menus, notes and status lines.

use chrono::{Local, TimeZone};
use colored::Colorize;
use nostr_feed::FeedEntry;
use std::io::Write;

const RULE_WIDTH: usize = 50;

pub const MAIN_MENU: &str = "[V]iew [F]eed, [P]rofile, [W]rite a Note, [H]elp, [E][X]it: ";
pub const FEED_PROMPT: &str = "[Enter] Next, [B]ack, [Q]uote, [R]eply, [T]op, [L]oad, [M]ain Menu: ";
pub const BROADCAST_MENU: &str = "[V]iew Event, [B]roadcast, [M]ain Menu: ";

pub fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
    let _ = std::io::stdout().flush();
}

pub fn title(npub: &str) {
    clear_screen();
    println!("{}", "Nostr Terminal".bold());
    println!("{}", npub.dimmed());
    println!();
}

/// Running count of events while a feed loads.
pub fn progress(count: usize) {
    print!("\rFetching Stream {} {}", "=".repeat(count.min(RULE_WIDTH)), count);
    let _ = std::io::stdout().flush();
}

pub fn finish_progress() {
    println!();
}

/// Local date in `MM/DD/YYYY, hh:mm AM/PM` form.
pub fn format_timestamp(created_at: u64) -> String {
    i64::try_from(created_at)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|date| date.format("%m/%d/%Y, %I:%M %p").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

/// One note framed by rules. Colours alternate with the position in the feed.
pub fn note(entry: &FeedEntry<'_>, index: usize, total: usize) {
    let rule = "=".repeat(RULE_WIDTH);
    let body = format!(
        "{rule}\n{}  ({}/{})\n{}\n\n{}\n{rule}",
        entry.author,
        index + 1,
        total,
        format_timestamp(entry.event.created_at),
        entry.content
    );

    clear_screen();
    for line in body.lines() {
        if index % 2 == 0 {
            println!("{}", line.black().on_white());
        } else {
            println!("{}", line.white().on_black());
        }
    }
    println!();
}

pub fn end_of_feed() {
    println!("{}", "You have reached the end of the feed.".yellow());
}

pub fn empty_feed() {
    println!("{}", "No entries to show.".yellow());
}

pub fn timed_out(relays: &[String]) {
    if !relays.is_empty() {
        println!(
            "{} {}",
            "Gave up waiting on:".yellow(),
            relays.join(", ")
        );
    }
}

pub fn info(message: &str) {
    println!("{}", message.cyan());
}

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn error(message: &str) {
    println!("{}", message.red());
}

pub fn help() {
    clear_screen();
    println!("{}", "Help".bold());
    println!();
    println!("{}", "Main menu".underline());
    println!("  [V]iew [F]eed   page through notes from everyone you follow");
    println!("  [P]rofile       page through your own notes");
    println!("  [W]rite a Note  compose, sign and broadcast a new note");
    println!("  [H]elp          show this screen");
    println!("  [E][X]it        quit");
    println!();
    println!("{}", "Feed view".underline());
    println!("  [Enter]  next note");
    println!("  [B]ack   previous note");
    println!("  [Q]uote  write a note quoting the one on screen");
    println!("  [R]eply  reply to the note on screen");
    println!("  [T]op    reload and start from the newest note");
    println!("  [L]oad   fetch the feed again");
    println!("  [M]ain   back to the main menu");
    println!();
    println!("{}", "Writing".underline());
    println!("  Type \\n for a line break. After signing you can view the");
    println!("  event as it will be sent, broadcast it, or go back.");
    println!("  Writing needs NSEC in the environment.");
    println!();
    println!("Only the first letter of an answer matters, in either case.");
    println!();
}
