//! Plain-text rendering of the catalogue view.
//!
//! The renderer turns a [`CatalogueViewModel`] into a frame of ANSI-styled text. It
//! returns the frame instead of printing it so hosts decide where it goes.
//!
//! ```text
//! ┌ header: source name, query, count
//! │ rows: "  12  Title  [img]"
//! │ trailing "loading more..." line
//! └ footer: command help
//! ```

use crate::ui::viewmodel::{CatalogueViewModel, DisplayItem, EmptyState, HeaderInfo};
use std::fmt::Write;

const BOLD: &str = "\u{1b}[1m";
const DIM: &str = "\u{1b}[2m";
const RESET: &str = "\u{1b}[0m";

/// Command help shown in the footer.
pub const KEYBINDINGS: &str =
    "type <text>: search as you type | search <text>: submit | j/k: scroll | open <n>: details | q: quit";

/// Renders a full frame `cols` columns wide.
#[must_use]
pub fn render(vm: &CatalogueViewModel, cols: usize) -> String {
    let mut out = String::new();
    render_header(&mut out, &vm.header, cols);

    if vm.loading {
        let _ = writeln!(out, "{DIM}Loading...{RESET}");
    } else if let Some(empty) = &vm.empty_state {
        render_empty_state(&mut out, empty);
    } else {
        for item in &vm.display_items {
            render_row(&mut out, item, cols);
        }
        if vm.loading_more {
            let _ = writeln!(out, "{DIM}Loading more...{RESET}");
        }
    }

    render_footer(&mut out, vm, cols);
    out
}

fn render_header(out: &mut String, header: &HeaderInfo, cols: usize) {
    let search = if header.query.is_empty() {
        String::new()
    } else {
        format!("  search: \"{}\"", header.query)
    };
    let line = format!("{}{search}  ({} loaded)", header.title, header.count);
    let _ = writeln!(out, "{BOLD}{}{RESET}", truncate(&line, cols));
    let _ = writeln!(out, "{}", "─".repeat(cols.min(80)));
}

fn render_row(out: &mut String, item: &DisplayItem, cols: usize) {
    let marker = if item.has_thumbnail { " [img]" } else { "" };
    let width = cols.saturating_sub(8 + marker.len());
    let _ = writeln!(out, "{:>5}  {}{DIM}{marker}{RESET}", item.position, truncate(&item.title, width));
}

fn render_empty_state(out: &mut String, empty: &EmptyState) {
    let _ = writeln!(out, "{BOLD}{}{RESET}", empty.message);
    let _ = writeln!(out, "{DIM}{}{RESET}", empty.subtitle);
}

fn render_footer(out: &mut String, vm: &CatalogueViewModel, cols: usize) {
    let last = vm.first_visible + vm.display_items.len();
    let _ = writeln!(out, "{}", "─".repeat(cols.min(80)));
    if vm.total_count > 0 {
        let _ = writeln!(out, "{DIM}rows {}-{} of {}{RESET}", vm.first_visible, last.saturating_sub(1), vm.total_count);
    }
    let _ = writeln!(out, "{DIM}{}{RESET}", truncate(KEYBINDINGS, cols));
}

/// Truncates `text` to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewmodel() -> CatalogueViewModel {
        CatalogueViewModel {
            header: HeaderInfo {
                title: "Batoto".to_string(),
                query: "ber".to_string(),
                count: 2,
            },
            display_items: vec![
                DisplayItem {
                    position: 0,
                    title: "Berserk".to_string(),
                    has_thumbnail: true,
                },
                DisplayItem {
                    position: 1,
                    title: "Bernard".to_string(),
                    has_thumbnail: false,
                },
            ],
            first_visible: 0,
            total_count: 2,
            loading: false,
            loading_more: true,
            empty_state: None,
        }
    }

    #[test]
    fn frame_contains_title_rows_and_indicator() {
        let frame = render(&viewmodel(), 80);
        assert!(frame.contains("Batoto"));
        assert!(frame.contains("search: \"ber\""));
        assert!(frame.contains("Berserk"));
        assert!(frame.contains("[img]"));
        assert!(frame.contains("Loading more..."));
    }

    #[test]
    fn loading_hides_rows() {
        let mut vm = viewmodel();
        vm.loading = true;
        let frame = render(&vm, 80);
        assert!(frame.contains("Loading..."));
        assert!(!frame.contains("Berserk"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(truncate("abc", 0), "");
    }
}
