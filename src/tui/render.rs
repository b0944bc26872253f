use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::{App, AppState};
use super::theme::Palette;
use super::tree::{guide_prefix, in_active_layer, leader_len, node_icon, TreeNode};
use crate::constants::{EDITING_HINT_TEXT, EDITOR_PROMPT, FOOTER_TEXT, HINT_TEXT, LEADER_CHAR};
use crate::index::LabelPlacement;

/// How a row relates to the focused one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFocus {
    Selected,
    /// Sibling of the selected row, marked when layer dimming is on
    ActiveLayer,
    Other,
}

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let palette = app.palette();
    let editor_height = if app.state == AppState::Editing { 5 } else { 0 };
    let status_height = if app.selected_path.is_some() { 4 } else { 3 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),                // Tree
            Constraint::Length(editor_height), // Pattern editor
            Constraint::Length(status_height), // Status lines
            Constraint::Length(1),             // Footer
        ])
        .split(frame.area());

    render_tree(frame, chunks[0], app, &palette);
    if app.state == AppState::Editing {
        render_editor(frame, chunks[1], app, &palette);
    }
    render_status_bar(frame, chunks[2], app, &palette);
    render_footer(frame, chunks[3], app, &palette);
}

/// Render the tree panel and its scrollbar
fn render_tree(frame: &mut Frame, area: Rect, app: &mut App, palette: &Palette) {
    let block = Block::default()
        .title(format!(" {} ", app.root().display()))
        .borders(Borders::ALL)
        .border_style(palette.border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    app.set_viewport_height(inner.height as usize);
    let offset = app.scroll.offset();
    let selected = app.tree.selected();
    let focused = app.selected_node().cloned();

    let lines: Vec<Line> = app
        .nodes
        .iter()
        .enumerate()
        .skip(offset)
        .take(inner.height as usize)
        .map(|(i, node)| {
            let focus = if i == selected {
                RowFocus::Selected
            } else if app.dim_non_active_depth
                && focused
                    .as_ref()
                    .is_some_and(|f| in_active_layer(node, f))
            {
                RowFocus::ActiveLayer
            } else {
                RowFocus::Other
            };
            let dimmed = app.dim_non_active_depth && focus == RowFocus::Other;
            let expanded = node.is_directory && app.tree.is_expanded(&node.path);
            tree_row(node, expanded, focus, dimmed, palette)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), columns[0]);

    render_scrollbar(frame, columns[1], app, palette);
}

/// One tree row: marker, guides, icon, name, inline labels, then the count column
pub fn tree_row(
    node: &TreeNode,
    expanded: bool,
    focus: RowFocus,
    dimmed: bool,
    palette: &Palette,
) -> Line<'static> {
    let marker = match focus {
        RowFocus::Selected => "> ",
        RowFocus::ActiveLayer => "• ",
        RowFocus::Other => "  ",
    };
    let name_style = if dimmed {
        palette.muted
    } else if node.is_directory {
        palette.folder
    } else {
        palette.text
    };

    let mut name = node.name.clone();
    if node.is_directory {
        name.push('/');
    }

    let mut spans = vec![
        Span::styled(marker, palette.text),
        Span::styled(guide_prefix(node), palette.leader),
        Span::styled(format!("{} ", node_icon(node, expanded)), name_style),
        Span::styled(name, name_style),
    ];

    for label in node
        .labels
        .iter()
        .filter(|l| l.placement == LabelPlacement::Inline)
    {
        spans.push(Span::styled(format!(" [{}]", label.text), palette.label(label.tone)));
    }

    let counts: Vec<_> = node
        .labels
        .iter()
        .filter(|l| l.placement == LabelPlacement::CountColumn)
        .collect();
    if !counts.is_empty() {
        let content_len = Line::from(spans.clone()).width();
        let leader: String = std::iter::repeat(LEADER_CHAR)
            .take(leader_len(content_len))
            .collect();
        spans.push(Span::styled(format!(" {leader} "), palette.leader));
        for (i, label) in counts.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", palette.leader));
            }
            spans.push(Span::styled(label.text.clone(), palette.label(label.tone)));
        }
    }

    let line = Line::from(spans);
    if focus == RowFocus::Selected {
        line.style(palette.selected)
    } else {
        line
    }
}

fn render_scrollbar(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let height = area.height as usize;
    let Some(thumb) = app.scroll.thumb(app.nodes.len(), height) else {
        return;
    };
    let lines: Vec<Line> = (0..height)
        .map(|row| {
            if row >= thumb.start && row < thumb.start + thumb.size {
                Line::from(Span::styled("┃", palette.scrollbar_thumb))
            } else {
                Line::from(Span::styled("│", palette.scrollbar_track))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the pattern editor with its prompt and validation message
fn render_editor(frame: &mut Frame, area: Rect, app: &mut App, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(EDITOR_PROMPT, palette.text.add_modifier(Modifier::BOLD))),
        chunks[0],
    );

    app.editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.info),
    );
    app.editor.set_style(palette.text);
    frame.render_widget(&app.editor, chunks[1]);

    if let Some(error) = &app.error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.clone(), palette.error)),
            chunks[2],
        );
    }
}

/// Hint line, filter summary, active markers and the selection
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let mut markers = vec![
        Span::styled("Comment markers: ", palette.muted),
        Span::styled(app.patterns.display(), palette.info),
    ];
    if app.state == AppState::Editing {
        markers.push(Span::styled(EDITING_HINT_TEXT, palette.muted));
    }

    let mut lines = vec![
        Line::from(Span::styled(HINT_TEXT, palette.muted)),
        Line::from(Span::styled(
            app.cache().options().filter_summary(),
            palette.muted,
        )),
        Line::from(markers),
    ];
    if let Some(path) = &app.selected_path {
        lines.push(Line::from(vec![
            Span::styled("Selected: ", palette.muted),
            Span::styled(path.display().to_string(), palette.text),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let mut spans = vec![Span::raw(FOOTER_TEXT)];
    if let Some(message) = &app.status_message {
        spans.push(Span::raw(format!(" | {message}")));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(palette.status_bar),
        area,
    );
}

/// Plain text of a rendered line, for tests and snapshots
pub fn line_text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{LabelTone, TreeLabel};
    use crate::tui::theme::{resolve_theme, ColorMode, TerminalCapability, ThemeName};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn palette() -> Palette {
        resolve_theme(ThemeName::Dark, ColorMode::Color, TerminalCapability::TrueColor)
    }

    fn node(name: &str, is_directory: bool, labels: Vec<TreeLabel>) -> TreeNode {
        TreeNode {
            name: name.to_string(),
            path: PathBuf::from("/r").join(name),
            is_directory,
            depth: 1,
            is_last: false,
            parent_is_last: Vec::new(),
            labels,
        }
    }

    fn count(text: &str) -> TreeLabel {
        TreeLabel {
            text: text.to_string(),
            tone: LabelTone::Info,
            placement: LabelPlacement::CountColumn,
        }
    }

    #[test]
    fn test_row_without_counts() {
        let line = tree_row(
            &node("src", true, vec![TreeLabel {
                text: "source".to_string(),
                tone: LabelTone::Success,
                placement: LabelPlacement::Inline,
            }]),
            true,
            RowFocus::Selected,
            false,
            &palette(),
        );
        assert_eq!(line_text(&line), "> ├─v src/ [source]");
        assert_eq!(line.style, palette().selected);
    }

    #[test]
    fn test_count_column_leader() {
        let line = tree_row(
            &node("a.ts", false, vec![count("TODO:: 2"), count("FIXME: 1")]),
            false,
            RowFocus::Other,
            false,
            &palette(),
        );
        let text = line_text(&line);
        // "  ├─· a.ts" is 10 columns wide
        let leader: String = std::iter::repeat(LEADER_CHAR).take(52).collect();
        assert_eq!(text, format!("  ├─· a.ts {leader} TODO:: 2  FIXME: 1"));
    }

    #[test]
    fn test_active_layer_marker() {
        let line = tree_row(
            &node("b.ts", false, Vec::new()),
            false,
            RowFocus::ActiveLayer,
            false,
            &palette(),
        );
        assert!(line_text(&line).starts_with("• "));
    }
}
