use std::{borrow::Cow, ops::Range};

use crate::{
    font::{self, ADVANCE, GLYPH_HEIGHT},
    virtual_buffer::{Color, Rect, VIRTUAL_HEIGHT, VIRTUAL_WIDTH, VirtualDisplay},
    visualizer::{Command, Markers, PopMode, StackVisualizer},
};

const MARGIN: usize = 4;
const RIGHT: usize = VIRTUAL_WIDTH - MARGIN;

const INPUT: Rect = Rect::new(40, 14, RIGHT - 40, 12);
const BUTTON_Y: usize = 32;
const BUTTON_HEIGHT: usize = 14;
const PANEL: Rect = Rect::new(MARGIN, 50, RIGHT - MARGIN, 20);

const HEADER_Y: usize = 76;
const ROWS_TOP: usize = 88;
const ROW_HEIGHT: usize = 12;
/// How many stack rows fit below the header
pub const VISIBLE_ROWS: usize = (VIRTUAL_HEIGHT - ROWS_TOP) / ROW_HEIGHT;

const VALUE_X: usize = 72;
const VALUE_WIDTH: usize = 176;
const RBP_X: usize = 254;
const RSP_X: usize = 284;

const PLACEHOLDER: &str = "Enter value (e.g., 0x42, 100)";

const HELP: Rect = Rect::new(MARGIN, 14, RIGHT - MARGIN, 182);
const HELP_LINE_HEIGHT: usize = 9;

/// The explanation card shown over the widget while help is open
const HELP_LINES: [(&str, Color); 19] = [
    ("x86-64 Stack Architecture", Color::Primary),
    ("Learn how the CPU stack works in RAM", Color::Muted),
    ("with RSP and RBP registers", Color::Muted),
    ("", Color::Muted),
    ("PUSH operation", Color::Item),
    ("- Decrements RSP by 8 bytes (64-bit)", Color::Foreground),
    ("- Stores value at new RSP location", Color::Foreground),
    ("- Stack grows toward lower addresses", Color::Foreground),
    ("- Assembly: push rax", Color::Foreground),
    ("POP operation", Color::Destructive),
    ("- Reads value from current RSP location", Color::Foreground),
    ("- Increments RSP by 8 bytes", Color::Foreground),
    ("- Stack shrinks toward higher addresses", Color::Foreground),
    ("- Assembly: pop rax", Color::Foreground),
    ("Stack registers", Color::Accent),
    ("- RSP: stack pointer (top of stack)", Color::Foreground),
    ("- RBP: base pointer (frame base)", Color::Foreground),
    ("- Each slot is 8 bytes on x86-64", Color::Foreground),
    ("F1 or Esc to close", Color::Muted),
];

/// The three clickable commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Push,
    Pop,
    Clear,
}

impl Button {
    const ALL: [Button; 3] = [Button::Push, Button::Pop, Button::Clear];

    pub const fn rect(self) -> Rect {
        match self {
            Button::Push => Rect::new(MARGIN, BUTTON_Y, 100, BUTTON_HEIGHT),
            Button::Pop => Rect::new(110, BUTTON_Y, 100, BUTTON_HEIGHT),
            Button::Clear => Rect::new(216, BUTTON_Y, 100, BUTTON_HEIGHT),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Button::Push => "PUSH (RSP-=8)",
            Button::Pop => "POP (RSP+=8)",
            Button::Clear => "CLEAR STACK",
        }
    }

    pub fn command(self) -> Command {
        match self {
            Button::Push => Command::Push,
            Button::Pop => Command::Pop,
            Button::Clear => Command::Clear,
        }
    }

    fn enabled(self, state: &StackVisualizer) -> bool {
        match self {
            Button::Push => state.can_push(),
            Button::Pop => state.can_pop(),
            Button::Clear => state.can_clear(),
        }
    }

    /// Fill color while enabled. Outline-only buttons have none.
    fn fill(self) -> Option<Color> {
        match self {
            Button::Push => Some(Color::Item),
            Button::Pop => Some(Color::Destructive),
            Button::Clear => None,
        }
    }
}

/// Returns the button under the virtual pixel `(x, y)`
pub fn button_at(x: usize, y: usize) -> Option<Button> {
    Button::ALL.into_iter().find(|b| b.rect().contains(x, y))
}

/// Splits a stack of `len` slots into the number of hidden bottom slots and the range of slots
/// that get a row. The top of the stack always stays visible; when slots are hidden one row is
/// given up for the overflow line.
pub fn visible_slots(len: usize, rows: usize) -> (usize, Range<usize>) {
    if len <= rows {
        return (0, 0..len);
    }

    let hidden = len - rows.saturating_sub(1);
    (hidden, hidden..len)
}

/// Shortens `text` to at most `max_chars` characters, marking the cut with `..`
fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }

    let kept: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    Cow::Owned(kept + "..")
}

/// The last `max_chars` characters of `text`
fn tail(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }

    match text.char_indices().nth(count - max_chars) {
        Some((index, _)) => &text[index..],
        None => text,
    }
}

/// The label shown inside a slot
fn tag(markers: Markers, mode: PopMode) -> Option<&'static str> {
    match mode {
        PopMode::Register => markers.contains(Markers::BASE).then_some("BASE"),
        PopMode::Discard if markers.contains(Markers::TOP | Markers::BASE) => Some("TOP/BOTTOM"),
        PopMode::Discard if markers.contains(Markers::TOP) => Some("TOP"),
        PopMode::Discard => markers.contains(Markers::BASE).then_some("BOTTOM"),
    }
}

fn hex(address: u64) -> String {
    format!("0x{address:x}")
}

/// Draws the whole widget for `state`, with the explanation card on top when `help` is set
pub fn draw(state: &StackVisualizer, help: bool, display: &mut VirtualDisplay) {
    display.clear(Color::Background);

    draw_header(state, display);
    draw_input(state, display);
    for button in Button::ALL {
        draw_button(button, button.enabled(state), display);
    }
    draw_registers(state, display);
    draw_stack(state, display);

    if help {
        draw_help(display);
    }
}

fn draw_header(state: &StackVisualizer, display: &mut VirtualDisplay) {
    display.draw_text(MARGIN, MARGIN, "x86-64 Stack Operations", Color::Primary);

    let mode = match state.pop_mode() {
        PopMode::Register => "POP -> REG",
        PopMode::Discard => "LIFO",
    };
    let mode_x = RIGHT - font::text_width(mode);
    display.draw_text(mode_x, MARGIN, mode, Color::Muted);

    let hint = "F1 HELP";
    display.draw_text(mode_x - 12 - font::text_width(hint), MARGIN, hint, Color::Muted);
}

fn draw_input(state: &StackVisualizer, display: &mut VirtualDisplay) {
    display.draw_text(MARGIN, INPUT.y + 3, "REG", Color::Muted);
    display.fill_rect(INPUT, Color::Panel);
    display.stroke_rect(INPUT, Color::Muted);

    if state.register().is_empty() {
        display.draw_text(INPUT.x + 3, INPUT.y + 3, "_", Color::Accent);
        display.draw_text(INPUT.x + 3 + ADVANCE, INPUT.y + 3, PLACEHOLDER, Color::Muted);
        return;
    }

    let max_chars = (INPUT.width - 6) / ADVANCE - 1;
    let end = display.draw_text(
        INPUT.x + 3,
        INPUT.y + 3,
        tail(state.register(), max_chars),
        Color::Foreground,
    );
    display.draw_text(end, INPUT.y + 3, "_", Color::Accent);
}

fn draw_button(button: Button, enabled: bool, display: &mut VirtualDisplay) {
    let rect = button.rect();
    let label = button.label();
    let text_x = rect.x + (rect.width - font::text_width(label)) / 2;
    let text_y = rect.y + (rect.height - GLYPH_HEIGHT) / 2;

    if !enabled {
        display.stroke_rect(rect, Color::Muted);
        display.draw_text(text_x, text_y, label, Color::Muted);
        return;
    }

    match button.fill() {
        Some(fill) => display.fill_rect(rect, fill),
        None => display.stroke_rect(rect, Color::Foreground),
    }
    display.draw_text(text_x, text_y, label, Color::Foreground);
}

fn draw_registers(state: &StackVisualizer, display: &mut VirtualDisplay) {
    display.fill_rect(PANEL, Color::Panel);

    let line = PANEL.y + 2;
    let rsp = format!("RSP: {}", hex(state.stack_pointer()));
    display.draw_text(PANEL.x + 4, line, &rsp, Color::Accent);

    let rbp = match state.base_pointer() {
        Some(address) => format!("RBP: {}", hex(address)),
        None => "RBP: null".to_owned(),
    };
    display.draw_text(PANEL.x + 116, line, &rbp, Color::Primary);

    let size = format!(
        "SIZE: {} * 8 = {} BYTES",
        state.stack().len(),
        state.byte_size()
    );
    display.draw_text(PANEL.x + 4, line + GLYPH_HEIGHT + 2, &size, Color::Foreground);
}

fn draw_stack(state: &StackVisualizer, display: &mut VirtualDisplay) {
    display.draw_text(MARGIN, HEADER_Y, "ADDRESS", Color::Muted);
    display.draw_text(VALUE_X, HEADER_Y, "STACK MEMORY", Color::Muted);
    display.draw_text(RBP_X, HEADER_Y, "POINTERS", Color::Muted);
    display.fill_rect(Rect::new(MARGIN, HEADER_Y + 9, RIGHT - MARGIN, 1), Color::Muted);

    let entries = state.stack().entries();
    if entries.is_empty() {
        let y = ROWS_TOP;
        display.draw_text(MARGIN, y + 2, &hex(state.memory().base()), Color::Muted);
        display.draw_text(VALUE_X, y + 2, "Stack is empty", Color::Foreground);
        display.draw_text(RSP_X, y + 2, ">RSP", Color::Accent);
        display.draw_text(
            VALUE_X,
            y + ROW_HEIGHT + 2,
            "Push values to see them grow downward",
            Color::Muted,
        );
        return;
    }

    let (hidden, slots) = visible_slots(entries.len(), VISIBLE_ROWS);
    let mut y = ROWS_TOP;
    if hidden > 0 {
        let more = format!("... {hidden} more toward RBP");
        display.draw_text(VALUE_X, y + 2, &more, Color::Muted);
        y += ROW_HEIGHT;
    }

    for index in slots {
        draw_slot(state, index, y, display);
        y += ROW_HEIGHT;
    }
}

fn draw_help(display: &mut VirtualDisplay) {
    display.fill_rect(HELP, Color::Panel);
    display.stroke_rect(HELP, Color::Primary);

    let mut y = HELP.y + 4;
    for (line, color) in HELP_LINES {
        display.draw_text(HELP.x + 6, y, line, color);
        y += HELP_LINE_HEIGHT;
    }
}

fn draw_slot(state: &StackVisualizer, index: usize, y: usize, display: &mut VirtualDisplay) {
    let entry = &state.stack().entries()[index];
    let markers = state.markers(index);

    display.draw_text(MARGIN, y + 2, &hex(state.address(index)), Color::Muted);

    let slot = Rect::new(VALUE_X, y, VALUE_WIDTH, ROW_HEIGHT - 2);
    display.fill_rect(slot, Color::Item);

    let mut room = slot.width - 6;
    if let Some(tag) = tag(markers, state.pop_mode()) {
        let width = font::text_width(tag);
        let tag_x = slot.x + slot.width - 3 - width;
        display.fill_rect(Rect::new(tag_x - 2, y + 1, width + 4, GLYPH_HEIGHT + 1), Color::Primary);
        display.draw_text(tag_x, y + 2, tag, Color::Foreground);
        room -= width + 4 + ADVANCE;
    }
    display.draw_text(
        slot.x + 3,
        y + 2,
        &truncate(&entry.value, room / ADVANCE),
        Color::Foreground,
    );

    if markers.contains(Markers::RBP) {
        display.draw_text(RBP_X, y + 2, ">RBP", Color::Primary);
    }
    if markers.contains(Markers::RSP) {
        display.draw_text(RSP_X, y + 2, ">RSP", Color::Accent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::Memory, visualizer::reduce};
    use pretty_assertions::assert_eq;

    fn with_entries(mode: PopMode, values: &[&str]) -> StackVisualizer {
        values
            .iter()
            .fold(StackVisualizer::new(Memory::default(), mode), |state, value| {
                let state = value
                    .chars()
                    .fold(state, |state, c| reduce(state, Command::Type(c)));
                reduce(state, Command::Push)
            })
    }

    #[test]
    fn buttons_are_found_by_position() {
        assert_eq!(button_at(5, 33), Some(Button::Push));
        assert_eq!(button_at(150, 40), Some(Button::Pop));
        assert_eq!(button_at(315, 45), Some(Button::Clear));
        assert_eq!(button_at(107, 40), None);
        assert_eq!(button_at(50, 10), None);
    }

    #[test]
    fn buttons_map_to_commands() {
        assert_eq!(Button::Push.command(), Command::Push);
        assert_eq!(Button::Pop.command(), Command::Pop);
        assert_eq!(Button::Clear.command(), Command::Clear);
    }

    #[test]
    fn small_stacks_show_every_slot() {
        assert_eq!(visible_slots(0, VISIBLE_ROWS), (0, 0..0));
        assert_eq!(visible_slots(3, 9), (0, 0..3));
        assert_eq!(visible_slots(9, 9), (0, 0..9));
    }

    #[test]
    fn deep_stacks_hide_the_bottom() {
        assert_eq!(visible_slots(10, 9), (2, 2..10));
        assert_eq!(visible_slots(30, 9), (22, 22..30));
    }

    #[test]
    fn truncate_and_tail() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789", 6), "0123..");
        assert_eq!(tail("abc", 5), "abc");
        assert_eq!(tail("abcdef", 2), "ef");
        assert_eq!(tail("h\u{e9}llo", 4), "\u{e9}llo");
    }

    #[test]
    fn tags_depend_on_pop_mode() {
        let both = Markers::all();
        assert_eq!(tag(both, PopMode::Register), Some("BASE"));
        assert_eq!(tag(both, PopMode::Discard), Some("TOP/BOTTOM"));
        assert_eq!(tag(Markers::TOP | Markers::RSP, PopMode::Discard), Some("TOP"));
        assert_eq!(tag(Markers::BASE | Markers::RBP, PopMode::Discard), Some("BOTTOM"));
        assert_eq!(tag(Markers::TOP | Markers::RSP, PopMode::Register), None);
        assert_eq!(tag(Markers::empty(), PopMode::Discard), None);
    }

    #[test]
    fn disabled_buttons_are_outlined_only() {
        let mut display = VirtualDisplay::new(1);
        let state = StackVisualizer::default();
        draw(&state, false, &mut display);

        let inside = (Button::Push.rect().x + 1, Button::Push.rect().y + 1);
        assert_eq!(display.get_pixel(inside.0, inside.1), Some(Color::Background));

        let state = reduce(state, Command::Type('1'));
        draw(&state, false, &mut display);
        assert_eq!(display.get_pixel(inside.0, inside.1), Some(Color::Item));
    }

    #[test]
    fn every_visible_slot_gets_a_box() {
        let values: Vec<String> = (0..12).map(|n| n.to_string()).collect();
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        let state = with_entries(PopMode::Register, &values);
        let mut display = VirtualDisplay::new(1);
        draw(&state, false, &mut display);

        // the overflow line takes the first row, slots follow
        assert_eq!(display.get_pixel(VALUE_X, ROWS_TOP), Some(Color::Background));
        for row in 1..VISIBLE_ROWS {
            let y = ROWS_TOP + row * ROW_HEIGHT;
            assert_eq!(display.get_pixel(VALUE_X, y), Some(Color::Item));
        }
    }

    #[test]
    fn single_entry_in_lifo_mode_is_both_top_and_bottom() {
        let state = with_entries(PopMode::Discard, &["1"]);
        let mut display = VirtualDisplay::new(1);
        draw(&state, false, &mut display);

        // the pill behind the tag is wide enough for the combined label
        let width = font::text_width("TOP/BOTTOM");
        let tag_x = VALUE_X + VALUE_WIDTH - 3 - width;
        assert_eq!(display.get_pixel(tag_x - 2, ROWS_TOP + 1), Some(Color::Primary));
    }

    #[test]
    fn empty_register_shows_placeholder() {
        let mut display = VirtualDisplay::new(1);
        let state = StackVisualizer::default();
        draw(&state, false, &mut display);

        // top bar of the placeholder's leading E
        let at = (INPUT.x + 3 + ADVANCE, INPUT.y + 3);
        assert_eq!(display.get_pixel(at.0, at.1), Some(Color::Muted));

        let state = reduce(state, Command::Type('1'));
        draw(&state, false, &mut display);
        assert_eq!(display.get_pixel(at.0, at.1), Some(Color::Panel));
    }

    #[test]
    fn help_card_covers_the_widget() {
        let state = with_entries(PopMode::Register, &["1", "2"]);
        let mut display = VirtualDisplay::new(1);
        draw(&state, false, &mut display);
        assert_eq!(display.get_pixel(HELP.x, HELP.y), Some(Color::Background));
        assert_eq!(display.get_pixel(VALUE_X, ROWS_TOP), Some(Color::Item));

        draw(&state, true, &mut display);
        assert_eq!(display.get_pixel(HELP.x, HELP.y), Some(Color::Primary));
        assert_eq!(display.get_pixel(VALUE_X, ROWS_TOP), Some(Color::Panel));
        assert!(HELP.y + 4 + HELP_LINES.len() * HELP_LINE_HEIGHT <= HELP.y + HELP.height);
        for (line, _) in HELP_LINES {
            assert!(font::text_width(line) <= HELP.width - 12, "{line}");
        }
    }

    #[test]
    fn long_values_stay_inside_the_slot() {
        let long = "z".repeat(200);
        let state = with_entries(PopMode::Discard, &[&long]);
        let mut display = VirtualDisplay::new(1);
        draw(&state, false, &mut display);

        // nothing bleeds between the slot and the pointer column
        for x in VALUE_X + VALUE_WIDTH..RBP_X {
            assert_eq!(display.get_pixel(x, ROWS_TOP + 2), Some(Color::Background));
        }
    }
}
