#![no_main]

use glide_protocol::{ScrollCommand, ScrollSequenceError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(command) = ScrollCommand::parse_bytes(data) else {
        return;
    };

    // Anything accepted names a scroll and re-parses to the same command.
    let text = std::str::from_utf8(data).expect("accepted payload is UTF-8");
    assert!(text.contains("scroll="), "accepted payload without scroll field");
    let canonical = format!(
        "scroll={};top={};bot={};grid={}",
        command.delta, command.top, command.bot, command.grid
    );
    assert_eq!(ScrollCommand::parse(&canonical), Ok(command));

    // Dropping the scroll field always rejects.
    let without: String = text
        .split(';')
        .filter(|field| !field.starts_with("scroll="))
        .collect::<Vec<_>>()
        .join(";");
    assert!(matches!(
        ScrollCommand::parse(&without),
        Err(ScrollSequenceError::MissingScroll)
    ));

    // Region bounds are always ordered and inside the grid.
    for height in [0, 1, 24, u32::MAX] {
        if let Some((top, bottom)) = command.region(height) {
            assert!(top < bottom && bottom <= height);
        }
    }
});
